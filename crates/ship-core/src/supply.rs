//! 工廠供應模型

use serde::{Deserialize, Serialize};

/// 工廠對某產品的可用供應量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyEntry {
    /// 產品ID
    pub product: String,

    /// 工廠ID
    pub plant: String,

    /// 可用供應量（整數單位）
    pub quantity: u64,
}

impl SupplyEntry {
    /// 創建新的供應項
    pub fn new(product: impl Into<String>, plant: impl Into<String>, quantity: u64) -> Self {
        Self {
            product: product.into(),
            plant: plant.into(),
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_supply_entry() {
        let entry = SupplyEntry::new("nail_1", "plant_2", 120);

        assert_eq!(entry.product, "nail_1");
        assert_eq!(entry.plant, "plant_2");
        assert_eq!(entry.quantity, 120);
    }
}
