use anyhow::{anyhow, Result};
use cube_network::request::{CalculationFlavour, Selection, TreeValuesSource};
use cube_types::values::Value;

pub const METRIC_COUNT: u32 = 8;

/// A generated call tree: node `i` has parent `(i - 1) / 2`, and metric `m` measures
/// `(m + 1) * (i + 1)` exclusively at node `i`.
///
/// System resources weight the values. Resource `r` contributes `r + 1`; selecting none
/// weighs everything by one.
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    cnode_count: usize,
}

impl SyntheticSource {
    pub fn new(cnode_count: usize) -> Self {
        Self { cnode_count }
    }

    fn exclusive(&self, metric: u32) -> Vec<f64> {
        (0..self.cnode_count)
            .map(|i| f64::from(metric + 1) * (i as f64 + 1.))
            .collect()
    }

    fn inclusive(&self, metric: u32) -> Vec<f64> {
        let mut values = self.exclusive(metric);
        // Children have larger indices than their parents.
        for i in (1..values.len()).rev() {
            values[(i - 1) / 2] += values[i];
        }
        values
    }
}

impl TreeValuesSource for SyntheticSource {
    fn tree_values(
        &self,
        metrics: &[Selection],
        sysres: &[Selection],
    ) -> Result<(Vec<Value>, Vec<Value>)> {
        let weight = if sysres.is_empty() {
            1.
        } else {
            sysres.iter().map(|sel| f64::from(sel.id) + 1.).sum()
        };

        let mut inclusive = vec![0.; self.cnode_count];
        let mut exclusive = vec![0.; self.cnode_count];
        for sel in metrics {
            if sel.id >= METRIC_COUNT {
                return Err(anyhow!("no metric with id {}", sel.id));
            }
            let (incl, excl) = match sel.flavour {
                CalculationFlavour::Inclusive | CalculationFlavour::Same => {
                    (self.inclusive(sel.id), self.exclusive(sel.id))
                }
                CalculationFlavour::Exclusive | CalculationFlavour::None => {
                    let excl = self.exclusive(sel.id);
                    (excl.clone(), excl)
                }
            };
            for (acc, v) in inclusive.iter_mut().zip(incl) {
                *acc += v * weight;
            }
            for (acc, v) in exclusive.iter_mut().zip(excl) {
                *acc += v * weight;
            }
        }

        Ok((
            inclusive.into_iter().map(Value::from).collect(),
            exclusive.into_iter().map(Value::from).collect(),
        ))
    }
}
