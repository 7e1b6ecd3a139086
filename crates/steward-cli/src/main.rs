use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::time::{Instant, sleep};
use tracing_subscriber::EnvFilter;

use steward_core::domain::{Authentication, SecurityContext, TenantId};
use steward_core::impls::{
    AmbientTenantProvider, CountingJob, CountingJobConfig, ThreadLocalContextStore, TokioScheduler,
};
use steward_core::ports::SecurityContextStore;
use steward_core::{Steward, StewardBuilder, StewardConfig};

#[derive(Debug, Parser)]
#[command(name = "steward", about = "Run a single-flight job on behalf of a user and watch its progress")]
struct Cli {
    /// How many times to submit the job back to back
    #[arg(long, default_value_t = 2)]
    submissions: u32,

    #[arg(long, default_value_t = 50)]
    steps: u32,

    #[arg(long, default_value_t = 50)]
    step_ms: u64,

    /// Overrides `schedule_delay_ms` from the config file
    #[arg(long)]
    delay_ms: Option<u64>,

    #[arg(long, default_value = "user")]
    principal: String,

    #[arg(long, default_value = "someTenantId")]
    tenant: String,

    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// JSON file with a `StewardConfig`
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> anyhow::Result<StewardConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            StewardConfig::from_json(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => StewardConfig::default(),
    };
    if let Some(ms) = cli.delay_ms {
        config.schedule_delay_ms = ms;
    }
    Ok(config)
}

/// 「リクエストスレッド」役: ログイン状態で submit し、終わったらコンテキストを消す
fn submit_as_user(
    cli: &Cli,
    steward: &Steward,
    store: &ThreadLocalContextStore,
    tenants: &AmbientTenantProvider,
) -> anyhow::Result<()> {
    store.set_current(SecurityContext::authenticated(Authentication::user(
        cli.principal.clone(),
        &["ROLE_USER"],
    )));
    let _tenant = tenants.enter(TenantId::new(cli.tenant.clone()));

    for _ in 0..cli.submissions {
        let receipt = steward.submit()?;
        println!("{}", serde_json::to_string(&receipt)?);
    }

    store.clear_current();
    Ok(())
}

/// Expected run time plus slack; `None` when it does not fit a `Duration`
/// (then polling only stops once the run has come and gone).
fn poll_budget(delay_ms: u64, steps: u32, step_ms: u64) -> Option<Duration> {
    u64::from(steps)
        .saturating_mul(step_ms)
        .checked_add(delay_ms)
        .map(Duration::from_millis)
        .and_then(|expected| expected.checked_add(Duration::from_secs(5)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let job_config = CountingJobConfig {
        steps: cli.steps,
        step_ms: cli.step_ms,
    };

    let store = Arc::new(ThreadLocalContextStore::new());
    let tenants = Arc::new(AmbientTenantProvider::new(TenantId::new("default")));
    let scheduler = Arc::new(TokioScheduler::current()?);

    let steward = StewardBuilder::new()
        .context_store(store.clone())
        .tenants(tenants.clone())
        .scheduler(scheduler.clone())
        .config(config.clone())
        .job(|progress| CountingJob::new(progress, job_config))
        .build()?;

    submit_as_user(&cli, &steward, &store, &tenants)?;

    // 最初の run が始まって終わるまでポーリング
    let give_up = poll_budget(config.schedule_delay_ms, cli.steps, cli.step_ms)
        .and_then(|budget| Instant::now().checked_add(budget));
    let mut seen_active = false;
    while give_up.is_none_or(|t| Instant::now() < t) {
        let status = steward.status();
        println!("{}", serde_json::to_string(&status)?);
        if !status.is_idle() {
            seen_active = true;
        } else if seen_active {
            break;
        }
        sleep(Duration::from_millis(cli.poll_ms)).await;
    }

    scheduler.shutdown_and_drain().await;
    tracing::info!(status = ?steward.status(), "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_budget_adds_slack() {
        assert_eq!(poll_budget(100, 50, 50), Some(Duration::from_millis(7_600)));
    }

    #[test]
    fn poll_budget_saturates_instead_of_overflowing() {
        assert_eq!(poll_budget(u64::MAX, 50, 50), None);
        assert!(poll_budget(0, u32::MAX, u64::MAX).is_some());
    }
}
