use crate::index::{KeywordIdIndex, TopicId};

/// Number of ids handed to one worker
pub const BATCH_SIZE: usize = 600;

/// A unit of work for the comment worker pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBatch {
    /// Keyword the ids were found under
    pub keyword: String,

    /// Consecutive slice of that keyword's ids
    pub ids: Vec<TopicId>,
}

/// Splits every keyword's ids into consecutive batches of `batch_size`
///
/// The last batch of a keyword may be shorter. Keywords with no ids produce
/// no batches.
pub fn plan_batches(index: &KeywordIdIndex, batch_size: usize) -> Vec<CommentBatch> {
    let batch_size = batch_size.max(1);

    index
        .iter()
        .flat_map(|(keyword, ids)| {
            ids.chunks(batch_size).map(move |chunk| CommentBatch {
                keyword: keyword.clone(),
                ids: chunk.to_vec(),
            })
        })
        .collect()
}
