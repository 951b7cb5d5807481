/// # Piece Table Module.
///
/// The editable view of a document: an ordered list of pieces, each pointing
/// either into the read-only paged original or into an append-only buffer
/// of inserted bytes.
pub mod piece;
pub mod table;

/// Initial (and post-reset) capacity of the append buffer.
pub const BASELINE_CAPACITY: usize = 4096;
