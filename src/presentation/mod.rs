//! 展示层
//!
//! 终端里的批次预览、确认对话和进度输出。核心只需要这里给出的决定。

use anyhow::{Context, Result};
use dialoguer::Select;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::models::{format_mb, Plan, Tier};
use crate::orchestrator::{Outcome, UploadEvent};
use crate::utils::logging::{append_log_line, truncate_text};

/// 用户对计划的决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDecision {
    Proceed,
    Cancel,
    /// 换档位后重新计划
    ChangeTier(Tier),
}

/// 输出批次预览
pub fn log_plan(plan: &Plan, input_count: usize) {
    info!("\n{}", "=".repeat(60));
    info!("🏷️ 档位: {}", plan.limits);
    info!(
        "📦 {} 个文件 ({} MB) 将分 {} 条消息发送",
        input_count,
        format_mb(plan.total_bytes()),
        plan.batch_count()
    );
    info!("{}", "=".repeat(60));

    for (i, batch) in plan.batches.iter().enumerate() {
        info!(
            "  批次 {}: {} 个文件 • {} MB",
            i + 1,
            batch.len(),
            batch.total_mb()
        );
        for file in batch.files() {
            info!("      - {}", truncate_text(&file.name, 60));
        }
    }

    if !plan.skipped.is_empty() {
        warn!("⚠️ {} 个文件将被跳过:", plan.skipped.len());
        for record in &plan.skipped {
            warn!("      - {}: {}", truncate_text(&record.file.name, 60), record.reason);
        }
    }
}

/// 确认对话里的选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptAction {
    Proceed,
    ChangeTier,
    Cancel,
}

/// 计划里没有批次时不提供"开始"，只能换档位或取消
fn prompt_actions(can_proceed: bool) -> Vec<(&'static str, PromptAction)> {
    let mut actions = Vec::with_capacity(3);
    if can_proceed {
        actions.push(("开始批量上传", PromptAction::Proceed));
    }
    actions.push(("更换档位", PromptAction::ChangeTier));
    actions.push(("取消", PromptAction::Cancel));
    actions
}

/// 询问用户是否按计划上传
pub async fn confirm_plan(current: Tier, can_proceed: bool) -> Result<PlanDecision> {
    tokio::task::spawn_blocking(move || prompt_decision(current, can_proceed))
        .await
        .context("确认对话异常退出")?
}

fn prompt_decision(current: Tier, can_proceed: bool) -> Result<PlanDecision> {
    let actions = prompt_actions(can_proceed);
    let labels: Vec<&str> = actions.iter().map(|(label, _)| *label).collect();
    let choice = Select::new()
        .with_prompt(format!("当前档位: {}", current))
        .items(&labels)
        .default(0)
        .interact()
        .context("读取选择失败")?;

    match actions.get(choice).map(|(_, action)| *action) {
        Some(PromptAction::Proceed) => Ok(PlanDecision::Proceed),
        Some(PromptAction::ChangeTier) => {
            let labels: Vec<String> = Tier::ALL
                .iter()
                .map(|tier| tier.limits().to_string())
                .collect();
            let picked = Select::new()
                .with_prompt("选择你的 Discord 档位")
                .items(&labels)
                .default(current.id() as usize)
                .interact()
                .context("读取档位失败")?;
            Ok(PlanDecision::ChangeTier(Tier::ALL[picked]))
        }
        Some(PromptAction::Cancel) | None => Ok(PlanDecision::Cancel),
    }
}

/// 消费会话事件，输出进度并把结果写入日志文件
pub async fn report_events(mut rx: mpsc::UnboundedReceiver<UploadEvent>, log_file: String) {
    while let Some(event) = rx.recv().await {
        match event {
            UploadEvent::PlanReady(plan) => {
                record(&log_file, &format!(
                    "计划: {} 批, 跳过 {} 个文件 ({})",
                    plan.batch_count(),
                    plan.skipped.len(),
                    plan.limits.tier_label
                ));
            }
            UploadEvent::Progress { done, total } => {
                let percentage = done * 100 / total.max(1);
                info!("📊 进度: {}/{} ({}%)", done, total, percentage);
            }
            UploadEvent::LocationDrift { paused: true } => {
                warn!("⏸️ 已暂停：请回到开始上传的频道，或按 Ctrl+C 取消");
            }
            UploadEvent::LocationDrift { paused: false } => {
                info!("▶️ 已恢复上传");
            }
            UploadEvent::Finished(outcome) => {
                let line = match outcome {
                    Outcome::Completed => "结果: 全部批次上传完成".to_string(),
                    Outcome::Cancelled => "结果: 用户取消".to_string(),
                    Outcome::Failed(stage) => format!("结果: 上传失败 ({})", stage),
                };
                record(&log_file, &line);
            }
        }
    }
}

fn record(log_file: &str, line: &str) {
    if let Err(e) = append_log_line(log_file, line) {
        warn!("写入日志文件失败 {}: {}", log_file, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileDescriptor;
    use crate::services::plan;

    #[tokio::test]
    async fn test_report_events_writes_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("log.txt").to_string_lossy().to_string();

        let files = vec![FileDescriptor::new("a.bin", 10).into_ref()];
        let plan = plan(&files, &Tier::Free.limits());

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UploadEvent::PlanReady(plan)).unwrap();
        tx.send(UploadEvent::Progress { done: 1, total: 1 }).unwrap();
        tx.send(UploadEvent::Finished(Outcome::Completed)).unwrap();
        drop(tx);

        report_events(rx, log_file.clone()).await;

        let content = std::fs::read_to_string(&log_file).unwrap();
        assert!(content.contains("计划: 1 批, 跳过 0 个文件 (Free)"));
        assert!(content.contains("结果: 全部批次上传完成"));
    }

    #[test]
    fn test_empty_plan_offers_no_proceed() {
        let actions: Vec<_> = prompt_actions(false).into_iter().map(|(_, a)| a).collect();
        assert_eq!(actions, vec![PromptAction::ChangeTier, PromptAction::Cancel]);

        let actions: Vec<_> = prompt_actions(true).into_iter().map(|(_, a)| a).collect();
        assert_eq!(actions[0], PromptAction::Proceed);
        assert_eq!(actions.len(), 3);
    }
}
