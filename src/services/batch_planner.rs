//! 批次规划服务 - 业务能力层
//!
//! 纯函数：输入文件列表和限制，输出批次和被跳过的文件，不做任何 I/O。
//!
//! 算法（First Fit Decreasing 装箱）：
//! 1. 单个文件超过单文件上限的直接跳过
//! 2. 其余文件按大小降序稳定排序
//! 3. 依次放入第一个还装得下的批次（数量、总量都不超限），都装不下就新开一个批次
//! 4. 批次的创建顺序就是发送顺序

use crate::models::{format_mb, Batch, FileRef, LimitsProfile, Plan, SkipRecord};

/// 生成上传计划
pub fn plan(files: &[FileRef], limits: &LimitsProfile) -> Plan {
    let mut eligible = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();

    for file in files {
        if file.size_bytes > limits.per_file_bytes_max {
            skipped.push(SkipRecord {
                file: file.clone(),
                reason: format!(
                    "超出单文件上限 ({}MB > {}MB)",
                    format_mb(file.size_bytes),
                    format_mb(limits.per_file_bytes_max)
                ),
            });
        } else {
            eligible.push(file.clone());
        }
    }

    // sort_by 是稳定排序，大小相同的文件保持原始顺序
    eligible.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));

    let mut batches: Vec<Batch> = Vec::new();
    for file in eligible {
        match batches.iter_mut().find(|batch| batch.accepts(&file, limits)) {
            Some(batch) => batch.push(file),
            None => batches.push(Batch::with_first(file)),
        }
    }

    Plan {
        limits: limits.clone(),
        batches,
        skipped,
    }
}

/// 文件是否超出宿主的直接上传限制（需要分批）
pub fn needs_batching(files: &[FileRef], limits: &LimitsProfile) -> bool {
    // 总大小溢出 u64 时一定超限
    let total = files
        .iter()
        .try_fold(0u64, |acc, f| acc.checked_add(f.size_bytes));
    files.iter().any(|f| f.size_bytes > limits.per_file_bytes_max)
        || total.map_or(true, |total| total > limits.per_message_bytes_max)
        || files.len() > limits.max_files_per_message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileDescriptor, Tier, BYTES_PER_MB};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn files_of(sizes: &[u64]) -> Vec<FileRef> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, size)| FileDescriptor::new(format!("file_{}.bin", i), *size).into_ref())
            .collect()
    }

    fn mb(n: u64) -> u64 {
        n * BYTES_PER_MB
    }

    /// 每个输入文件恰好出现一次
    fn assert_coverage(files: &[FileRef], plan: &Plan) {
        let mut seen: HashSet<*const FileDescriptor> = HashSet::new();
        for batch in &plan.batches {
            for file in batch.files() {
                assert!(seen.insert(Arc::as_ptr(file)), "文件重复: {}", file.name);
            }
        }
        for record in &plan.skipped {
            assert!(seen.insert(Arc::as_ptr(&record.file)), "文件重复: {}", record.file.name);
        }
        assert_eq!(seen.len(), files.len());
        for file in files {
            assert!(seen.contains(&Arc::as_ptr(file)), "文件丢失: {}", file.name);
        }
    }

    fn assert_caps(plan: &Plan, limits: &LimitsProfile) {
        for batch in &plan.batches {
            assert!(!batch.is_empty());
            assert!(batch.len() <= limits.max_files_per_message);
            assert!(batch.total_bytes() <= limits.per_message_bytes_max);
            let sum: u64 = batch.files().iter().map(|f| f.size_bytes).sum();
            assert_eq!(sum, batch.total_bytes());
        }
    }

    #[test]
    fn test_empty_input() {
        let plan = plan(&[], &Tier::Free.limits());
        assert!(plan.batches.is_empty());
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_equal_sized_files_free_tier() {
        // 12 个 10MB 文件，Free 档位：第三个文件会让总量到 30MB，所以每批 2 个
        let limits = Tier::Free.limits();
        let files = files_of(&[mb(10); 12]);
        let plan = plan(&files, &limits);

        assert!(plan.skipped.is_empty());
        assert_eq!(plan.batch_count(), 6);
        for batch in &plan.batches {
            assert_eq!(batch.len(), 2);
            assert_eq!(batch.total_bytes(), mb(20));
        }
        // 大小相同的文件保持原始顺序
        assert_eq!(plan.batches[0].files()[0].name, "file_0.bin");
        assert_eq!(plan.batches[0].files()[1].name, "file_1.bin");
        assert_eq!(plan.batches[5].files()[1].name, "file_11.bin");
        assert_coverage(&files, &plan);
    }

    #[test]
    fn test_oversized_file_is_skipped() {
        let limits = Tier::Nitro.limits();
        let files = files_of(&[mb(600)]);
        let plan = plan(&files, &limits);

        assert!(plan.batches.is_empty());
        assert_eq!(plan.skipped.len(), 1);
        assert!(Arc::ptr_eq(&plan.skipped[0].file, &files[0]));
        assert_eq!(plan.skipped[0].reason, "超出单文件上限 (600.0MB > 500.0MB)");
    }

    #[test]
    fn test_file_count_cap() {
        let limits = Tier::NitroBasic.limits();
        let files = files_of(&[mb(1); 15]);
        let plan = plan(&files, &limits);

        assert!(plan.skipped.is_empty());
        assert_eq!(plan.batch_count(), 2);
        assert_eq!(plan.batches[0].len(), 10);
        assert_eq!(plan.batches[1].len(), 5);
        assert_coverage(&files, &plan);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let limits = LimitsProfile::custom("test", 100, 200, 3).unwrap();

        // 恰好等于单文件上限的文件不跳过
        let plan_a = plan(&files_of(&[100]), &limits);
        assert!(plan_a.skipped.is_empty());
        assert_eq!(plan_a.batch_count(), 1);

        // 恰好填满总量上限
        let plan_b = plan(&files_of(&[100, 100]), &limits);
        assert_eq!(plan_b.batch_count(), 1);
        assert_eq!(plan_b.batches[0].total_bytes(), 200);

        // 恰好填满数量上限
        let plan_c = plan(&files_of(&[1, 1, 1, 1]), &limits);
        assert_eq!(plan_c.batch_count(), 2);
        assert_eq!(plan_c.batches[0].len(), 3);

        // 超出一个字节就跳过
        let plan_d = plan(&files_of(&[101]), &limits);
        assert_eq!(plan_d.skipped.len(), 1);
    }

    #[test]
    fn test_first_fit_backfills_earlier_batches() {
        // 降序后：70, 60, 30, 20, 10
        // 70 -> 新批次0; 60 -> 新批次1; 30 -> 批次0 (100); 20 -> 批次1 (80); 10 -> 批次1 (90)
        let limits = LimitsProfile::custom("test", 100, 100, 10).unwrap();
        let files = files_of(&[10, 70, 20, 60, 30]);
        let plan = plan(&files, &limits);

        let sizes: Vec<Vec<u64>> = plan
            .batches
            .iter()
            .map(|b| b.files().iter().map(|f| f.size_bytes).collect())
            .collect();
        assert_eq!(sizes, vec![vec![70, 30], vec![60, 20, 10]]);
        assert_caps(&plan, &limits);
        assert_coverage(&files, &plan);
    }

    #[test]
    fn test_per_message_cap_below_per_file_cap() {
        // 单文件上限高于单消息上限时，超出单消息上限的文件仍然单独成批
        let limits = LimitsProfile::custom("test", 100, 50, 10).unwrap();
        let files = files_of(&[80, 20, 20, 20]);
        let plan = plan(&files, &limits);

        assert!(plan.skipped.is_empty());
        assert_eq!(plan.batches[0].total_bytes(), 80);
        assert_eq!(plan.batches[0].len(), 1);
        assert_eq!(plan.batches[1].total_bytes(), 40);
        assert_eq!(plan.batches[2].total_bytes(), 20);
        assert_coverage(&files, &plan);
    }

    #[test]
    fn test_mixed_sizes_respect_caps() {
        let limits = Tier::Free.limits();
        let sizes: Vec<u64> = (0..40u64).map(|i| (i * 7_919_113) % mb(30)).collect();
        let files = files_of(&sizes);
        let plan = plan(&files, &limits);

        assert_caps(&plan, &limits);
        assert_coverage(&files, &plan);
        for record in &plan.skipped {
            assert!(record.file.size_bytes > limits.per_file_bytes_max);
        }
        for batch in &plan.batches {
            for file in batch.files() {
                assert!(file.size_bytes <= limits.per_file_bytes_max);
            }
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let limits = Tier::Free.limits();
        let files = files_of(&[mb(3), mb(12), mb(3), mb(7), mb(24), mb(1), mb(12)]);

        let first = plan(&files, &limits);
        let second = plan(&files, &limits);

        assert_eq!(first.batch_count(), second.batch_count());
        for (a, b) in first.batches.iter().zip(&second.batches) {
            assert_eq!(a.len(), b.len());
            for (fa, fb) in a.files().iter().zip(b.files()) {
                assert!(Arc::ptr_eq(fa, fb));
            }
        }
    }

    #[test]
    fn test_replan_with_new_tier_starts_from_scratch() {
        let files = files_of(&[mb(40), mb(30), mb(5)]);

        let free = plan(&files, &Tier::Free.limits());
        assert_eq!(free.skipped.len(), 2);
        assert_eq!(free.batch_count(), 1);

        let nitro = plan(&files, &Tier::Nitro.limits());
        assert!(nitro.skipped.is_empty());
        assert_eq!(nitro.batch_count(), 1);
        assert_eq!(nitro.batches[0].len(), 3);
    }

    #[test]
    fn test_needs_batching() {
        let limits = Tier::Free.limits();
        assert!(!needs_batching(&files_of(&[mb(5), mb(5)]), &limits));
        assert!(needs_batching(&files_of(&[mb(26)]), &limits));
        assert!(needs_batching(&files_of(&[mb(15), mb(15)]), &limits));
        assert!(needs_batching(&files_of(&[1; 11]), &limits));
    }

    #[test]
    fn test_sizes_near_u64_max_do_not_overflow() {
        let limits = LimitsProfile::custom("Unbounded", u64::MAX, u64::MAX, 10).unwrap();
        let files = files_of(&[5, u64::MAX - 1]);

        let plan = plan(&files, &limits);
        assert_eq!(plan.batch_count(), 2);
        assert_eq!(plan.batches[0].total_bytes(), u64::MAX - 1);
        assert_eq!(plan.batches[1].total_bytes(), 5);
        assert_eq!(plan.total_bytes(), u64::MAX);

        assert!(needs_batching(&files, &limits));
        assert!(!needs_batching(&files_of(&[u64::MAX - 1]), &limits));
    }
}
