//! # Example: save_cycle
//!
//! Demonstrates one full save cycle with both component groups, a failing
//! component, stale-data cleanup and a commit step.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► register UI-bound: window-layout, editor-tabs (fails)
//!   ├─► register background: search-index
//!   ├─► save(false) ─► Completed { saved: 2, failed: 1, cleared: 1 }
//!   └─► concurrent save while busy ─► Rejected
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=savevisor=debug cargo run --example save_cycle
//! ```

use std::sync::Arc;
use std::time::Duration;

use savevisor::{
    BoxError, Capability, CommitFn, ComponentRef, LogWriter, SaveConfig, SaveError, SaveFn,
    SaveOrchestrator, SaveResult, SessionProducer, StaleStorageDescriptor, StaticDescriptors,
    Storage, StorageResolver, Subscribe,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct PrintingStorage;

impl StorageResolver for PrintingStorage {
    fn resolve(&self, file: &str) -> Option<Arc<dyn Storage>> {
        (file == "workspace.xml").then(|| Arc::new(PrintingStorage) as Arc<dyn Storage>)
    }
}

impl Storage for PrintingStorage {
    fn session_producer(&self) -> Option<Arc<dyn SessionProducer>> {
        Some(Arc::new(PrintingStorage))
    }
}

impl SessionProducer for PrintingStorage {
    fn clear_state(&self, component: &str) -> Result<(), BoxError> {
        println!("[storage] cleared state of {component}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = SaveConfig {
        project_level: true,
        component_timeout: Duration::from_secs(5),
        ..SaveConfig::default()
    };
    let commit = CommitFn::arc(|force: bool, _ctx: CancellationToken| async move {
        println!("[commit] writing storages (force={force})");
        Ok::<_, SaveError>(())
    });
    let descriptors = Arc::new(StaticDescriptors::new(vec![StaleStorageDescriptor::new(
        "workspace.xml",
        ["LegacyToolWindowManager"],
        true,
    )]));
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    let orch = SaveOrchestrator::builder(cfg, commit)
        .with_subscribers(subs)
        .with_cleanup(Arc::new(PrintingStorage), descriptors)
        .build();

    let layout: ComponentRef = SaveFn::arc("window-layout", |_ctx: CancellationToken| async {
        Ok::<_, SaveError>(())
    });
    let tabs: ComponentRef = SaveFn::arc("editor-tabs", |_ctx: CancellationToken| async {
        Err::<(), _>(SaveError::fail("tab state is read-only"))
    });
    let index: ComponentRef = SaveFn::arc("search-index", |ctx: CancellationToken| async move {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(200)) => Ok::<_, SaveError>(()),
            _ = ctx.cancelled() => Err(SaveError::Canceled),
        }
    });
    orch.registry().register(layout, Capability::UiBound);
    orch.registry().register(tabs, Capability::UiBound);
    orch.registry().register(index, Capability::Background);

    let ctx = CancellationToken::new();
    let errors = SaveResult::new();
    let second_errors = SaveResult::new();
    let (first, second) = tokio::join!(orch.save(false, &errors, &ctx), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        orch.save(true, &second_errors, &ctx).await
    });

    println!("[main] first:  {:?}", first?);
    println!("[main] second: {:?}", second?);
    for failure in errors.failures() {
        println!("[main] failure: {failure}");
    }

    // Give the subscriber worker a moment to flush.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
