//! Payment processors an account can be linked to.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    Stripe,
    PayPal,
}

impl Processor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Processor::Stripe => "stripe",
            Processor::PayPal => "paypal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stripe" => Some(Processor::Stripe),
            "paypal" => Some(Processor::PayPal),
            _ => None,
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for p in [Processor::Stripe, Processor::PayPal] {
            assert_eq!(Processor::parse(p.as_str()), Some(p));
        }
        assert_eq!(Processor::parse("square"), None);
    }
}
