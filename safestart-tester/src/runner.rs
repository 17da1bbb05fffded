use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::assets::TesterAssets;
use crate::scenarios::{Scenario, ScenarioCtx};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

pub struct LogicTester<'a> {
    assets: &'a TesterAssets,
    verbose: bool,
}

impl<'a> LogicTester<'a> {
    pub const fn new(assets: &'a TesterAssets, verbose: bool) -> Self {
        Self { assets, verbose }
    }

    pub fn run_scenario(&self, scenario: &Scenario, iterations: usize) -> ScenarioResult {
        if self.verbose {
            println!("🧪 Testing scenario: {}", scenario.name.bright_white());
        }

        let mut failures = Vec::new();
        let mut performance_data = Vec::with_capacity(iterations);
        for iteration in 0..iterations {
            let ctx = ScenarioCtx {
                assets: self.assets,
                verbose: self.verbose,
                iteration,
            };
            let start = Instant::now();
            let outcome = scenario.run(&ctx);
            performance_data.push(start.elapsed());
            if let Err(err) = outcome {
                log::debug!("{} iteration {iteration} failed: {err:#}", scenario.name);
                failures.push(format!("iteration {iteration}: {err:#}"));
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(u32::MAX)
        };

        ScenarioResult {
            scenario_name: scenario.name.to_string(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: iterations - failures.len(),
            failures,
            average_duration,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::get_scenario;

    #[test]
    fn runner_counts_iterations() {
        let assets = TesterAssets::default();
        let tester = LogicTester::new(&assets, false);
        let result = tester.run_scenario(get_scenario("smoke").unwrap(), 3);
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.iterations_run, 3);
        assert_eq!(result.successful_iterations, 3);
    }

    #[test]
    fn duration_serializes_as_millis() {
        let result = ScenarioResult {
            scenario_name: "x".into(),
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(42),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 42);
    }
}
