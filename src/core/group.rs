//! # Run one registry group of a save cycle.
//!
//! Iterates a group snapshot in registration order and saves each component,
//! collecting failures task-locally.
//!
//! ## Flow
//! ```text
//! for component in snapshot:
//!   ├─ cycle cancelled?            → canceled, stop
//!   ├─ save_one(component)
//!   │     ├─ Ok                    → publish ComponentSaved
//!   │     ├─ Err(Canceled)         → cancel cycle token, canceled, stop
//!   │     └─ Err(Fail/Timeout/Panic) → publish ComponentFailed, record, continue
//! publish GroupFinished
//! ```
//!
//! ## Rules
//! - A failing component never skips or aborts its siblings
//! - Cancellation is never recorded as a failure
//! - Each component gets a **child token**; a timeout cancels only that child

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::components::{Capability, ComponentRef, SaveComponent};
use crate::core::collector::SaveFailure;
use crate::error::{ContextError, SaveError, panic_message};
use crate::events::{Bus, Event, EventKind};

/// Outcome of one group task.
#[derive(Debug)]
pub(crate) struct GroupReport {
    pub saved: usize,
    pub failures: Vec<SaveFailure>,
    pub canceled: bool,
}

impl GroupReport {
    fn new() -> Self {
        Self {
            saved: 0,
            failures: Vec::new(),
            canceled: false,
        }
    }

    /// Report for a group whose scheduling context failed to run it.
    pub fn lost(group: Capability, err: ContextError) -> Self {
        Self {
            saved: 0,
            failures: vec![SaveFailure::new(
                group.as_label(),
                SaveError::fail(err.to_string()),
            )],
            canceled: false,
        }
    }
}

/// Saves every component of `components` sequentially.
pub(crate) async fn run_group(
    group: Capability,
    components: Arc<Vec<ComponentRef>>,
    cycle: CancellationToken,
    timeout: Option<Duration>,
    bus: Bus,
) -> GroupReport {
    let mut report = GroupReport::new();

    for component in components.iter() {
        if cycle.is_cancelled() {
            report.canceled = true;
            break;
        }

        match save_one(component.as_ref(), &cycle, timeout).await {
            Ok(()) => {
                report.saved += 1;
                bus.publish(
                    Event::new(EventKind::ComponentSaved)
                        .with_component(component.name())
                        .with_group(group),
                );
            }
            Err(SaveError::Canceled) => {
                report.canceled = true;
                cycle.cancel();
                break;
            }
            Err(e) => {
                bus.publish(
                    Event::new(EventKind::ComponentFailed)
                        .with_component(component.name())
                        .with_group(group)
                        .with_reason(e.to_string()),
                );
                report.failures.push(SaveFailure::new(component.name(), e));
            }
        }
    }

    bus.publish(
        Event::new(EventKind::GroupFinished)
            .with_group(group)
            .with_count(report.saved),
    );
    report
}

/// Runs one component save with panic isolation and the optional timeout.
async fn save_one(
    component: &dyn SaveComponent,
    cycle: &CancellationToken,
    timeout: Option<Duration>,
) -> Result<(), SaveError> {
    let child = cycle.child_token();
    let fut = AssertUnwindSafe(component.save(child.clone())).catch_unwind();

    let res = match timeout {
        Some(dur) => match time::timeout(dur, fut).await {
            Ok(r) => r,
            Err(_elapsed) => {
                child.cancel();
                return Err(SaveError::Timeout { timeout: dur });
            }
        },
        None => fut.await,
    };

    res.unwrap_or_else(|panic| {
        Err(SaveError::Panicked {
            info: panic_message(panic.as_ref()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::SaveFn;
    use parking_lot::Mutex;

    fn recording(
        name: &'static str,
        log: &Arc<Mutex<Vec<&'static str>>>,
        result: Result<(), SaveError>,
    ) -> ComponentRef {
        let log = Arc::clone(log);
        SaveFn::arc(name, move |_ctx: CancellationToken| {
            let log = Arc::clone(&log);
            let result = result.clone();
            async move {
                log.lock().push(name);
                result
            }
        })
    }

    #[tokio::test]
    async fn failure_does_not_skip_siblings() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let components = Arc::new(vec![
            recording("a", &log, Ok(())),
            recording("b", &log, Err(SaveError::fail("boom"))),
            recording("c", &log, Ok(())),
        ]);

        let report = run_group(
            Capability::UiBound,
            components,
            CancellationToken::new(),
            None,
            Bus::new(8),
        )
        .await;

        assert_eq!(*log.lock(), ["a", "b", "c"]);
        assert_eq!(report.saved, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(&*report.failures[0].source, "b");
        assert!(!report.canceled);
    }

    #[tokio::test]
    async fn cancellation_stops_the_group_and_is_not_recorded() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let components = Arc::new(vec![
            recording("a", &log, Err(SaveError::Canceled)),
            recording("b", &log, Ok(())),
        ]);
        let cycle = CancellationToken::new();

        let report = run_group(
            Capability::Background,
            components,
            cycle.clone(),
            None,
            Bus::new(8),
        )
        .await;

        assert_eq!(*log.lock(), ["a"]);
        assert!(report.canceled);
        assert!(report.failures.is_empty());
        assert!(cycle.is_cancelled());
    }

    #[tokio::test]
    async fn timeout_and_panic_are_recorded_failures() {
        let slow: ComponentRef = SaveFn::arc("slow", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Ok::<_, SaveError>(())
        });
        let panicky: ComponentRef = SaveFn::arc("panicky", |_ctx: CancellationToken| async {
            if true {
                panic!("state corrupted");
            }
            Ok::<_, SaveError>(())
        });

        let report = run_group(
            Capability::Background,
            Arc::new(vec![slow, panicky]),
            CancellationToken::new(),
            Some(Duration::from_millis(20)),
            Bus::new(8),
        )
        .await;

        assert_eq!(report.failures.len(), 2);
        assert!(matches!(
            report.failures[0].error,
            SaveError::Timeout { .. }
        ));
        assert!(matches!(
            &report.failures[1].error,
            SaveError::Panicked { info } if info == "state corrupted"
        ));
    }

    #[tokio::test]
    async fn publishes_component_and_group_events() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let log = Arc::new(Mutex::new(Vec::new()));

        run_group(
            Capability::UiBound,
            Arc::new(vec![
                recording("a", &log, Ok(())),
                recording("b", &log, Err(SaveError::fail("nope"))),
            ]),
            CancellationToken::new(),
            None,
            bus,
        )
        .await;

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            [
                EventKind::ComponentSaved,
                EventKind::ComponentFailed,
                EventKind::GroupFinished
            ]
        );
    }
}
