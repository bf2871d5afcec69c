/// ExtensionOptionDynamicFeeTx is an extension option that specifies the maxPrioPrice for cosmos tx
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExtensionOptionDynamicFeeTx {
    /// the same as `max_priority_fee_per_gas` in eip-1559 spec
    #[prost(string, tag="1")]
    pub max_priority_price: ::prost::alloc::string::String,
}
