//! The card preview a configuration session can be attached to.

use crate::core::NotetypeTemplate;

/// An editor showing one notetype that has not been saved yet.
///
/// The session edits the model in place and then tells the surface to
/// refresh; it never reads widget state.
pub trait PreviewSurface {
    fn current_model(&self) -> &NotetypeTemplate;

    fn current_model_mut(&mut self) -> &mut NotetypeTemplate;

    /// Flags the model as modified so closing the editor asks to save it.
    fn mark_changed(&mut self);

    fn redraw(&mut self, ordinal: usize);

    fn current_ordinal(&self) -> usize;
}

/// Replaces the previewed model and refreshes the surface at its current card.
pub fn show_model(surface: &mut dyn PreviewSurface, model: NotetypeTemplate) {
    *surface.current_model_mut() = model;
    refresh(surface);
}

pub(crate) fn refresh(surface: &mut dyn PreviewSurface) {
    surface.mark_changed();
    let ordinal = surface.current_ordinal();
    surface.redraw(ordinal);
}

/// A [`PreviewSurface`] without a window, recording what it was asked to do.
#[derive(Debug, Clone)]
pub struct MemoryPreview {
    pub model: NotetypeTemplate,
    pub ordinal: usize,
    pub changed: bool,
    pub redraws: Vec<usize>,
}

impl MemoryPreview {
    pub fn new(model: NotetypeTemplate) -> Self {
        Self { model, ordinal: 0, changed: false, redraws: Vec::new() }
    }
}

impl PreviewSurface for MemoryPreview {
    fn current_model(&self) -> &NotetypeTemplate {
        &self.model
    }

    fn current_model_mut(&mut self) -> &mut NotetypeTemplate {
        &mut self.model
    }

    fn mark_changed(&mut self) {
        self.changed = true;
    }

    fn redraw(&mut self, ordinal: usize) {
        self.redraws.push(ordinal);
    }

    fn current_ordinal(&self) -> usize {
        self.ordinal
    }
}
