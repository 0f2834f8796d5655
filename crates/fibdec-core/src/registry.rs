//! Calculator factory and registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::calculator::{Calculator, FibCalculator, FibError};
use crate::fastdoubling::DecimalFastDoubling;
use crate::reference::ReferenceFastDoubling;

/// Factory trait for creating calculators.
pub trait CalculatorFactory: Send + Sync {
    /// Get or create a calculator by name.
    fn get(&self, name: &str) -> Result<Arc<dyn Calculator>, FibError>;

    /// List all available calculator names.
    fn available(&self) -> Vec<&str>;
}

/// Default factory with lazy creation and cache.
pub struct DefaultFactory {
    cache: RwLock<HashMap<String, Arc<dyn Calculator>>>,
}

impl DefaultFactory {
    /// Create a new default factory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn create_calculator(name: &str) -> Result<Arc<dyn Calculator>, FibError> {
        match name {
            "decimal" | "fast" => {
                let core = Arc::new(DecimalFastDoubling::new());
                Ok(Arc::new(FibCalculator::new(core)))
            }
            "reference" | "bigint" => {
                let core = Arc::new(ReferenceFastDoubling::new());
                Ok(Arc::new(FibCalculator::new(core)))
            }
            _ => Err(FibError::Config(format!("unknown calculator: {name}"))),
        }
    }
}

impl Default for DefaultFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorFactory for DefaultFactory {
    fn get(&self, name: &str) -> Result<Arc<dyn Calculator>, FibError> {
        if let Some(calc) = self.cache.read().get(name) {
            return Ok(Arc::clone(calc));
        }

        // Another thread may have created it meanwhile; keep the first one.
        let created = Self::create_calculator(name)?;
        let mut cache = self.cache.write();
        let calc = cache.entry(name.to_string()).or_insert(created);
        Ok(Arc::clone(calc))
    }

    fn available(&self) -> Vec<&str> {
        vec!["decimal", "reference"]
    }
}
