use crate::error::{AnteError, AnteResult, ErrorKind};
use serde_derive::{Deserialize, Serialize};

pub type Gas = u64;

/// Tracks gas consumption for a single transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GasMeter {
    Basic { limit: Gas, consumed: Gas },
    Infinite { consumed: Gas },
}

impl GasMeter {
    pub fn new(limit: Gas) -> GasMeter {
        GasMeter::Basic { limit, consumed: 0 }
    }

    pub fn infinite() -> GasMeter {
        GasMeter::Infinite { consumed: 0 }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, GasMeter::Infinite { .. })
    }

    pub fn limit(&self) -> Gas {
        match self {
            GasMeter::Basic { limit, .. } => *limit,
            GasMeter::Infinite { .. } => Gas::MAX,
        }
    }

    pub fn gas_consumed(&self) -> Gas {
        match self {
            GasMeter::Basic { consumed, .. } | GasMeter::Infinite { consumed } => *consumed,
        }
    }

    pub fn gas_remaining(&self) -> Gas {
        self.limit().saturating_sub(self.gas_consumed())
    }

    /// Adds `amount` to the meter, failing once a finite limit is exceeded. The consumed
    /// amount is still recorded on failure so callers can report it.
    pub fn consume_gas(&mut self, amount: Gas, descriptor: &str) -> AnteResult<()> {
        let total = self.gas_consumed().checked_add(amount).ok_or_else(|| {
            AnteError::new(
                ErrorKind::OutOfGas,
                format!("gas overflow in location: {}", descriptor),
            )
        })?;
        match self {
            GasMeter::Basic { limit, consumed } => {
                *consumed = total;
                if total > *limit {
                    return Err(AnteError::new(
                        ErrorKind::OutOfGas,
                        format!(
                            "out of gas in location: {}; gasWanted: {}, gasUsed: {}",
                            descriptor, limit, total
                        ),
                    ));
                }
            }
            GasMeter::Infinite { consumed } => *consumed = total,
        }
        Ok(())
    }
}

/// Per operation costs charged by the store layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GasConfig {
    pub has_cost: Gas,
    pub delete_cost: Gas,
    pub read_cost_flat: Gas,
    pub read_cost_per_byte: Gas,
    pub write_cost_flat: Gas,
    pub write_cost_per_byte: Gas,
    pub iter_next_cost_flat: Gas,
}

impl GasConfig {
    /// Costs of the persistent key value store
    pub fn kv() -> GasConfig {
        GasConfig {
            has_cost: 1000,
            delete_cost: 1000,
            read_cost_flat: 1000,
            read_cost_per_byte: 3,
            write_cost_flat: 2000,
            write_cost_per_byte: 30,
            iter_next_cost_flat: 30,
        }
    }

    /// Costs of the transient store
    pub fn transient() -> GasConfig {
        GasConfig {
            has_cost: 100,
            delete_cost: 100,
            read_cost_flat: 100,
            read_cost_per_byte: 0,
            write_cost_flat: 200,
            write_cost_per_byte: 3,
            iter_next_cost_flat: 3,
        }
    }

    pub fn zero() -> GasConfig {
        GasConfig::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == GasConfig::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_meter_fails_past_limit() {
        let mut meter = GasMeter::new(100);
        meter.consume_gas(60, "first").unwrap();
        let err = meter.consume_gas(41, "second").unwrap_err();
        assert!(err.is(ErrorKind::OutOfGas));
        assert!(err.to_string().contains("out of gas in location: second"));
        assert_eq!(meter.gas_consumed(), 101);
    }

    #[test]
    fn infinite_meter_only_tracks() {
        let mut meter = GasMeter::infinite();
        meter.consume_gas(u64::MAX - 1, "big").unwrap();
        assert_eq!(meter.gas_consumed(), u64::MAX - 1);
        assert!(meter.consume_gas(5, "overflow").is_err());
        assert!(meter.is_infinite());
    }
}
