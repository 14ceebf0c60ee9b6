use proptest::prelude::*;
use worker_pool_dsl::{PoolSetting, SettingValue};

/// Strategy for picking one of the pool settings
pub fn pool_setting_strategy() -> impl Strategy<Value = PoolSetting> {
    prop::sample::select(PoolSetting::ALL.to_vec())
}

/// Strategy for setting values, including nulls the DSL must ignore
pub fn setting_value_strategy() -> impl Strategy<Value = SettingValue> {
    prop_oneof![
        Just(SettingValue::Null),
        (0i64..=100).prop_map(SettingValue::from),
        "[a-z_]{1,12}".prop_map(SettingValue::from),
        prop::collection::vec("[a-z_]{1,12}", 0..4).prop_map(SettingValue::from),
    ]
}

/// Strategy for sequences of top-level setting calls
pub fn setting_calls_strategy() -> impl Strategy<Value = Vec<(PoolSetting, SettingValue)>> {
    prop::collection::vec((pool_setting_strategy(), setting_value_strategy()), 1..24)
}

/// Strategy for explicit pools, each a list of non-null setting calls
pub fn explicit_pools_strategy() -> impl Strategy<Value = Vec<Vec<(PoolSetting, i64)>>> {
    prop::collection::vec(
        prop::collection::vec((pool_setting_strategy(), 0i64..=100), 0..6),
        0..6,
    )
}
