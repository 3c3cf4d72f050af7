//! Table converters: the structural accordion and the row-wise strategies.

pub mod accordion;
pub mod columns;
pub mod error;
pub mod simple;

use tablefold_core::plugin::TableConverter;

/// Return one converter per marker kind, in lookup order.
///
///  1. Accordion  (accordion, list-accordion)
///  2. Carousel   (carousel-horizontal, carousel-vertical)
///  3. List       (list)
///  4. Hidden     (no-show)
///
/// `no-conversion` has no converter; the session leaves those tables alone.
pub fn standard_converters() -> Vec<Box<dyn TableConverter>> {
    vec![
        Box::new(accordion::AccordionConverter),
        Box::new(simple::CarouselConverter),
        Box::new(simple::ListConverter),
        Box::new(simple::HiddenConverter),
    ]
}
