use std::sync::Arc;
use std::time::Duration;

use crate::models::Product;
use crate::product_manager::{CheckOutcome, ProductChecker};
use crate::utils::pacing::{SleepOutcome, Sleeper};

#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    pub between_items: Duration,
    pub between_cycles: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_items: Duration::from_secs(30),
            between_cycles: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub checked: usize,
    pub resolved: usize,
    pub exhausted: usize,
    pub interrupted: bool,
}

/// Walks the product list one item at a time, forever.
pub struct PriceMonitor {
    products: Vec<Product>,
    checker: Arc<dyn ProductChecker>,
    sleeper: Arc<dyn Sleeper>,
    pacing: Pacing,
}

impl PriceMonitor {
    pub fn new(
        products: Vec<Product>,
        checker: Arc<dyn ProductChecker>,
        sleeper: Arc<dyn Sleeper>,
        pacing: Pacing,
    ) -> Self {
        Self {
            products,
            checker,
            sleeper,
            pacing,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// One pass over every product, pausing between items but not after
    /// the last one.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        let total = self.products.len();

        for (index, product) in self.products.iter().enumerate() {
            let outcome = self.checker.check_product(product).await;
            report.checked += 1;

            match outcome {
                CheckOutcome::Resolved { .. } => report.resolved += 1,
                CheckOutcome::Exhausted { .. } => report.exhausted += 1,
                CheckOutcome::Interrupted { .. } => {
                    report.interrupted = true;
                    return report;
                }
            }

            if index + 1 < total {
                tracing::info!(
                    "Waiting {}s before the next product...",
                    self.pacing.between_items.as_secs()
                );
                let outcome = self.sleeper.sleep(self.pacing.between_items).await;
                if outcome == SleepOutcome::Interrupted {
                    report.interrupted = true;
                    return report;
                }
            }
        }

        report
    }

    /// Runs cycles until shutdown interrupts one of the waits.
    pub async fn run_forever(&self) {
        let mut cycle: u64 = 0;

        loop {
            cycle += 1;
            tracing::info!("=========== Price check cycle {} ===========", cycle);

            let report = self.run_cycle().await;
            if report.interrupted {
                tracing::info!("Shutdown requested during cycle {}, stopping monitor", cycle);
                return;
            }

            tracing::info!(
                "Cycle {} finished: {} checked, {} priced, {} failed. Next check in {}s",
                cycle,
                report.checked,
                report.resolved,
                report.exhausted,
                self.pacing.between_cycles.as_secs()
            );

            if self.sleeper.sleep(self.pacing.between_cycles).await == SleepOutcome::Interrupted {
                tracing::info!("Shutdown requested, stopping monitor");
                return;
            }
        }
    }
}
