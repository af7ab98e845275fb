//! 档位限制与单位换算

use std::fmt;

/// 1 MB 对应的字节数
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// 每条消息的默认文件数上限
pub const DEFAULT_MAX_FILES_PER_MESSAGE: usize = 10;

/// MB 转字节（向下取整）
pub fn mb_to_bytes(mb: f64) -> u64 {
    (mb * BYTES_PER_MB as f64).floor() as u64
}

/// 字节转 MB，保留一位小数
pub fn bytes_to_mb(bytes: u64) -> f64 {
    ((bytes as f64 / BYTES_PER_MB as f64) * 10.0).round() / 10.0
}

/// 格式化为一位小数的 MB 文本
pub fn format_mb(bytes: u64) -> String {
    format!("{:.1}", bytes_to_mb(bytes))
}

/// Discord 档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Free,
    NitroClassic,
    Nitro,
    NitroBasic,
}

impl Tier {
    /// 所有档位，按 id 排序
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::NitroClassic, Tier::Nitro, Tier::NitroBasic];

    /// 从档位 id 解析，未知 id 回退为 Free
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => Tier::NitroClassic,
            2 => Tier::Nitro,
            3 => Tier::NitroBasic,
            _ => Tier::Free,
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            Tier::Free => 0,
            Tier::NitroClassic => 1,
            Tier::Nitro => 2,
            Tier::NitroBasic => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::NitroClassic => "Nitro Classic",
            Tier::Nitro => "Nitro",
            Tier::NitroBasic => "Nitro Basic",
        }
    }

    /// (单文件上限 MB, 单消息总量上限 MB)
    fn caps_mb(&self) -> (f64, f64) {
        match self {
            Tier::Free => (25.0, 25.0),
            Tier::NitroClassic | Tier::NitroBasic => (50.0, 50.0),
            Tier::Nitro => (500.0, 500.0),
        }
    }

    /// 该档位对应的限制
    pub fn limits(&self) -> LimitsProfile {
        let (per_file_mb, per_message_mb) = self.caps_mb();
        LimitsProfile {
            tier_label: self.label().to_string(),
            per_file_bytes_max: mb_to_bytes(per_file_mb),
            per_message_bytes_max: mb_to_bytes(per_message_mb),
            max_files_per_message: DEFAULT_MAX_FILES_PER_MESSAGE,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 限制配置
///
/// 计划一旦基于它生成就不再修改；换档位必须重新计划。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitsProfile {
    pub tier_label: String,
    pub per_file_bytes_max: u64,
    pub per_message_bytes_max: u64,
    pub max_files_per_message: usize,
}

impl LimitsProfile {
    /// 直接指定限制，任一上限为 0 时返回 `None`
    pub fn custom(
        tier_label: impl Into<String>,
        per_file_bytes_max: u64,
        per_message_bytes_max: u64,
        max_files_per_message: usize,
    ) -> Option<Self> {
        if per_file_bytes_max == 0 || per_message_bytes_max == 0 || max_files_per_message == 0 {
            return None;
        }
        Some(Self {
            tier_label: tier_label.into(),
            per_file_bytes_max,
            per_message_bytes_max,
            max_files_per_message,
        })
    }
}

impl fmt::Display for LimitsProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (单文件 {} MB • 单消息 {} MB • 最多 {} 个文件)",
            self.tier_label,
            format_mb(self.per_file_bytes_max),
            format_mb(self.per_message_bytes_max),
            self.max_files_per_message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_table() {
        let free = Tier::from_id(0).limits();
        assert_eq!(free.per_file_bytes_max, 25 * BYTES_PER_MB);
        assert_eq!(free.per_message_bytes_max, 25 * BYTES_PER_MB);

        assert_eq!(Tier::from_id(1).limits().per_file_bytes_max, 50 * BYTES_PER_MB);
        assert_eq!(Tier::from_id(2).limits().per_message_bytes_max, 500 * BYTES_PER_MB);
        assert_eq!(Tier::from_id(3).limits().tier_label, "Nitro Basic");

        for tier in Tier::ALL {
            assert_eq!(tier.limits().max_files_per_message, 10);
            assert_eq!(Tier::from_id(tier.id()), tier);
        }
    }

    #[test]
    fn test_unknown_tier_falls_back_to_free() {
        assert_eq!(Tier::from_id(9), Tier::Free);
    }

    #[test]
    fn test_mb_conversions() {
        assert_eq!(mb_to_bytes(1.0), BYTES_PER_MB);
        assert_eq!(mb_to_bytes(0.5), BYTES_PER_MB / 2);
        assert_eq!(bytes_to_mb(600 * BYTES_PER_MB), 600.0);
        assert_eq!(format_mb(BYTES_PER_MB + BYTES_PER_MB / 4), "1.3");
        assert_eq!(format_mb(20 * BYTES_PER_MB), "20.0");
        assert_eq!(format_mb(0), "0.0");
    }

    #[test]
    fn test_custom_rejects_zero_caps() {
        assert!(LimitsProfile::custom("x", 0, 1, 1).is_none());
        assert!(LimitsProfile::custom("x", 1, 0, 1).is_none());
        assert!(LimitsProfile::custom("x", 1, 1, 0).is_none());

        // 单消息上限小于单文件上限是允许的
        let limits = LimitsProfile::custom("x", 10, 5, 2).unwrap();
        assert_eq!(limits.per_message_bytes_max, 5);
    }
}
