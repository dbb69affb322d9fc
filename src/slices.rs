//! Slice-by-slice application of a rank kernel to a whole stack.

use log::debug;

use crate::filters::RankKernel;
use crate::stack::ImageStack;

/// Filter every plane of `stack` in place, first slice to last.
///
/// An empty stack is left as is.
///
/// # Returns
/// The same stack, for chaining
pub fn apply(stack: &mut ImageStack, kernel: RankKernel, radius: f64) -> &mut ImageStack {
    apply_with(stack, kernel, radius, |_| {})
}

/// Like [`apply`], calling `on_slice` with each plane index once it is filtered.
pub fn apply_with<F>(
    stack: &mut ImageStack,
    kernel: RankKernel,
    radius: f64,
    mut on_slice: F,
) -> &mut ImageStack
where
    F: FnMut(usize),
{
    let total = stack.len();
    for (index, plane) in stack.planes_mut().iter_mut().enumerate() {
        let dim = plane.dim();
        kernel.apply(plane, radius);
        debug_assert_eq!(plane.dim(), dim);

        debug!("Filtered slice {}/{} with {}", index + 1, total, kernel);
        on_slice(index);
    }
    stack
}
