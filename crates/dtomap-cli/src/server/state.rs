//! Application state for the web server.

use std::sync::Arc;

use colored::Colorize;
use dtomap::{FieldAudit, FieldMapper};
use serde_json::Value;

use crate::mocks;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Mapper for the order endpoint.
    pub order: Arc<FieldMapper>,
    /// Mapper for the public user projection.
    pub slim_user: Arc<FieldMapper>,
    /// Mapper for dashboard product summaries.
    pub product_summary: Arc<FieldMapper>,
    /// Raw upstream order.
    pub raw_order: Arc<Value>,
    /// Raw upstream user.
    pub raw_user: Arc<Value>,
    /// Raw upstream product list.
    pub raw_products: Arc<Value>,
    /// Print per-request fallback reports.
    pub verbose: bool,
}

impl AppState {
    /// Create state backed by the built-in mock data.
    pub fn new() -> dtomap::Result<Self> {
        Ok(Self {
            order: Arc::new(FieldMapper::new(mocks::order_rules()?)),
            slim_user: Arc::new(FieldMapper::new(mocks::slim_user_rules()?)),
            product_summary: Arc::new(FieldMapper::new(mocks::product_summary_rules()?)),
            raw_order: Arc::new(mocks::mock_order()),
            raw_user: Arc::new(mocks::mock_user()),
            raw_products: Arc::new(mocks::mock_products()),
            verbose: false,
        })
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Report fields that fell back while serving `route`.
    pub fn report_fallbacks(&self, route: &str, audits: &[FieldAudit]) {
        if !self.verbose {
            return;
        }

        let fallbacks: Vec<&FieldAudit> = audits.iter().filter(|a| a.outcome.is_fallback()).collect();
        if fallbacks.is_empty() {
            println!("{} {}", route.cyan(), "all fields resolved".green());
            return;
        }

        for audit in fallbacks {
            println!(
                "{} {} <- {} ({:?}, fallback used)",
                route.cyan(),
                audit.target.white().bold(),
                audit.source,
                audit.outcome
            );
        }
    }
}
