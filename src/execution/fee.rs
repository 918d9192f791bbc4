use crate::asset::Balance;

/// Consolidated fee of one atomic unit, or of a whole route when summed.
///
/// Fees split by where they are taken from: the payer's free balance versus
/// the amount in flight. The split matters to callers because a fee deducted
/// from the amount reduces what later legs receive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OperationFee {
    pub paid_from_account: Balance,
    pub paid_from_amount: Balance,
}

impl OperationFee {
    pub fn from_account(amount: Balance) -> Self {
        Self { paid_from_account: amount, paid_from_amount: 0 }
    }

    pub fn total(&self) -> Balance {
        self.paid_from_account.saturating_add(self.paid_from_amount)
    }

    pub fn accumulate(&mut self, other: OperationFee) {
        self.paid_from_account = self.paid_from_account.saturating_add(other.paid_from_account);
        self.paid_from_amount = self.paid_from_amount.saturating_add(other.paid_from_amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_keeps_split() {
        let mut fee = OperationFee::from_account(10);
        fee.accumulate(OperationFee { paid_from_account: 5, paid_from_amount: 7 });

        assert_eq!(fee.paid_from_account, 15);
        assert_eq!(fee.paid_from_amount, 7);
        assert_eq!(fee.total(), 22);
    }

    #[test]
    fn test_total_saturates() {
        let fee = OperationFee { paid_from_account: Balance::MAX, paid_from_amount: 1 };
        assert_eq!(fee.total(), Balance::MAX);
    }
}
