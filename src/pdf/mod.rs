mod typst;

pub use typst::TypstRenderer;

use crate::error::Result;
use crate::store::{Invoice, Party, Profile};

/// Renders a structured invoice into PDF bytes. Deterministic for
/// identical inputs; the trait is the seam that lets the composer be
/// exercised without the typst binary.
pub trait Renderer {
    fn render(&self, invoice: &Invoice, party: &Party, profile: &Profile) -> Result<Vec<u8>>;
}
