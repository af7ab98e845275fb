//! 应用入口 - 编排层
//!
//! ## 核心功能
//!
//! 1. **初始化**：日志文件、用户设置、档位覆盖
//! 2. **扫描文件**：命令行给出的文件和目录
//! 3. **计划与确认**：生成计划交给展示层，换档位时从原始文件重新计划
//! 4. **资源管理**：持有 Browser，创建 JsExecutor 和 DiscordBridge
//! 5. **运行会话**：Ctrl+C 取消，输出最终结果

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::bridge::{DiscordBridge, HostTimings};
use crate::browser;
use crate::cli::Cli;
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::{load_settings, save_settings, scan_inputs, FileRef, Plan, Settings, Tier};
use crate::orchestrator::session::{EventSink, Outcome, UploadEvent};
use crate::orchestrator::upload_orchestrator::UploadOptions;
use crate::orchestrator::uploader::Uploader;
use crate::presentation::{self, PlanDecision};
use crate::services::{needs_batching, plan};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    cli: Cli,
    settings: Settings,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config, cli: Cli) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        let settings_path = Path::new(&config.settings_file);
        let mut settings = load_settings(settings_path).await?;

        if let Some(tier_id) = cli.tier {
            settings.default_tier = tier_id;
        }
        if cli.save_settings {
            save_settings(settings_path, &settings).await?;
        }

        Ok(Self {
            config,
            cli,
            settings,
        })
    }

    /// 运行应用主逻辑，返回会话结果（没有进入上传时为 `None`）
    pub async fn run(&self) -> Result<Option<Outcome>> {
        if !self.settings.enabled {
            warn!("⚠️ 设置中已禁用批量上传，程序结束");
            return Ok(None);
        }

        let files = scan_inputs(&self.cli.paths).await?;
        if files.is_empty() {
            warn!("⚠️ 没有找到待上传的文件，程序结束");
            return Ok(None);
        }

        logging::log_startup(self.settings.tier().label(), files.len());

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let events = EventSink::new(events_tx);
        let reporter = tokio::spawn(presentation::report_events(
            events_rx,
            self.config.output_log_file.clone(),
        ));

        let plan = match self.plan_with_confirmation(&files, &events).await? {
            Some(plan) => plan,
            None => {
                drop(events);
                let _ = reporter.await;
                return Ok(None);
            }
        };

        let outcome = self.upload(plan, events).await?;
        let _ = reporter.await;

        log_outcome(&outcome, &self.config);
        Ok(Some(outcome))
    }

    /// 生成计划并等待确认；取消、只看计划或没有可发送的文件时返回 `None`
    async fn plan_with_confirmation(
        &self,
        files: &[FileRef],
        events: &EventSink,
    ) -> Result<Option<Plan>> {
        let mode = if self.cli.dry_run {
            ConfirmMode::DryRun
        } else if self.cli.yes {
            ConfirmMode::AutoProceed
        } else {
            ConfirmMode::Interactive
        };

        negotiate_plan(files, self.settings.tier(), mode, events, presentation::confirm_plan).await
    }

    /// 连接浏览器并运行上传会话
    async fn upload(&self, plan: Plan, events: EventSink) -> Result<Outcome> {
        // 连接浏览器
        let (_browser, page) = browser::connect_to_browser_and_page(
            self.config.browser_debug_port,
            &self.config.target_url,
            Some(&self.config.target_title),
        )
        .await?;

        // 创建 JsExecutor（持有 page）
        let executor = JsExecutor::new(page);
        let bridge = DiscordBridge::new(executor, HostTimings::from_settings(&self.settings));

        let uploader = Uploader::new();
        let active = uploader.start(
            plan,
            Arc::new(bridge),
            UploadOptions::from_settings(&self.settings),
            events,
        )?;

        let handle = active.handle();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("收到 Ctrl+C，正在取消上传...");
                handle.cancel();
            }
        });

        let outcome = active.wait().await?;
        ctrl_c.abort();
        Ok(outcome)
    }
}

/// 计划确认方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfirmMode {
    Interactive,
    /// `--yes`
    AutoProceed,
    /// `--dry-run`
    DryRun,
}

/// 计划 → 决定 → 换档位后从原始文件重新计划，直到得到可发送的计划或放弃
///
/// `decide` 收到当前档位和计划里是否有批次。
pub(crate) async fn negotiate_plan<F, Fut>(
    files: &[FileRef],
    mut tier: Tier,
    mode: ConfirmMode,
    events: &EventSink,
    mut decide: F,
) -> Result<Option<Plan>>
where
    F: FnMut(Tier, bool) -> Fut,
    Fut: Future<Output = Result<PlanDecision>>,
{
    loop {
        let limits = tier.limits();
        let plan = plan(files, &limits);
        events.emit(UploadEvent::PlanReady(plan.clone()));
        presentation::log_plan(&plan, files.len());

        if !needs_batching(files, &limits) {
            info!("💡 文件没有超出 {} 的限制，将作为一条消息发送", tier);
        }
        if plan.is_empty() {
            warn!("⚠️ 所有文件都超出单文件上限，没有可发送的批次");
        }

        let decision = match mode {
            ConfirmMode::DryRun => {
                info!("🔍 仅输出计划 (--dry-run)，不上传");
                return Ok(None);
            }
            ConfirmMode::AutoProceed => PlanDecision::Proceed,
            ConfirmMode::Interactive => decide(tier, !plan.is_empty()).await?,
        };

        match decision {
            PlanDecision::Proceed if plan.is_empty() => return Ok(None),
            PlanDecision::Proceed => return Ok(Some(plan)),
            PlanDecision::Cancel => {
                info!("已取消，没有发送任何批次");
                return Ok(None);
            }
            PlanDecision::ChangeTier(next) => {
                info!("🏷️ 档位切换为: {}", next);
                tier = next;
            }
        }
    }
}

fn log_outcome(outcome: &Outcome, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 上传结束: {}", outcome);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}
