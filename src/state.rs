//! Coding state shared by all decoder variants.
//!
//! Block, sliding-window, fulcrum and perpetual decoders all hold a set of
//! linearly independent rows with one pivot column per row. They differ in
//! their index space (a fixed range, a sliding stream, an inner/outer
//! composition), which is the trait's associated `Index` type. Recoding
//! generators are written against this trait so they never need to know
//! which decoder they are looking at.

/// Per-symbol decoding status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymbolStatus {
    /// No row has its pivot at this column.
    #[default]
    Missing,
    /// A row pivots here but may still mix in other columns.
    Partial,
    /// The column is reduced to the identity; its data is final.
    Decoded,
}

/// Read-only view of a decoder's elimination state.
///
/// `symbols_decoded` and `symbols_partially_decoded` are conservative: a
/// column reported decoded is always truly decoded, but a decoder may report
/// a truly decoded column as only partially decoded.
pub trait CodingState {
    /// Symbol index type.
    type Index: Copy;

    /// Size of the index space.
    fn symbols(&self) -> usize;

    /// Independent rows held.
    fn rank(&self) -> usize;

    /// True if a row pivots at `index`.
    fn is_symbol_pivot(&self, index: Self::Index) -> bool;

    /// True if `index` is known to be fully decoded.
    fn is_symbol_decoded(&self, index: Self::Index) -> bool;

    /// Lower bound on the number of decoded symbols.
    fn symbols_decoded(&self) -> usize;

    /// Pivot symbols not (yet) reported decoded.
    fn symbols_partially_decoded(&self) -> usize {
        self.rank() - self.symbols_decoded()
    }

    /// Symbols without a pivot.
    fn symbols_missing(&self) -> usize {
        self.symbols() - self.rank()
    }

    /// True once every symbol is decoded.
    fn is_complete(&self) -> bool;
}
