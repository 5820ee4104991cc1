//! Transaction finality polling

use crate::domain::chains::ChainAttributeTable;
use crate::domain::tracker::{self, TxStatus};
use crate::infrastructure::thornode::Thornode;
use crate::shared::errors::QueryError;
use crate::shared::types::Chain;

/// Polls a node for everything needed to place a transaction on the
/// finality timeline. Callers re-poll roughly every `seconds_remaining`.
pub struct CheckTx {
    thornode: Thornode,
    chain_attributes: ChainAttributeTable,
}

impl CheckTx {
    pub fn new(thornode: Thornode) -> Self {
        Self::with_chain_attributes(thornode, ChainAttributeTable::default())
    }

    pub fn with_chain_attributes(thornode: Thornode, chain_attributes: ChainAttributeTable) -> Self {
        Self { thornode, chain_attributes }
    }

    /// Current stage and wait estimate for an inbound transaction hash.
    /// `source_chain` sharpens the estimate while the node has not yet
    /// observed the transaction.
    pub async fn tx_status(
        &self,
        hash: &str,
        source_chain: Option<Chain>,
    ) -> Result<TxStatus, QueryError> {
        let observed = self.thornode.get_observed_tx(hash).await?;
        if observed.is_none() {
            // nothing else upstream can know about an unobserved hash
            return tracker::evaluate(None, None, &[], &self.chain_attributes, source_chain)
                .map_err(Into::into);
        }
        let queue = self.thornode.get_scheduled_queue().await?;
        let queue_item = queue.iter().find(|item| item.in_hash.as_deref() == Some(hash));
        let last_blocks = self.thornode.get_last_block(None).await?;
        tracker::evaluate(
            observed.as_ref(),
            queue_item,
            &last_blocks,
            &self.chain_attributes,
            source_chain,
        )
        .map_err(Into::into)
    }
}
