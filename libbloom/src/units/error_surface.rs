//! The single error surface
//!
//! Shows `AppState.error` while it is set. A newer error replaces the older
//! one; dismissing clears it and leaves the view alone.

use crate::presentation::{DomEvent, DomEventKind, Rendered};
use crate::state::AppState;

use super::{Binding, Command, Unit, UnitContext, UnitKind};

pub struct ErrorSurface;

impl Unit for ErrorSurface {
    fn kind(&self) -> UnitKind {
        UnitKind::ErrorSurface
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![Binding::new("dismiss", DomEventKind::Click)]
    }

    fn on_interaction(
        &mut self,
        target: &str,
        _event: &DomEvent,
        ctx: &UnitContext<'_>,
    ) -> Vec<Command> {
        if target == "dismiss" && ctx.state.error.is_some() {
            vec![Command::DismissError]
        } else {
            Vec::new()
        }
    }

    fn is_presentable(&self, state: &AppState) -> bool {
        state.error.is_some()
    }

    fn render(&self, ctx: &UnitContext<'_>) -> Rendered {
        match &ctx.state.error {
            Some(notice) => {
                let line = match notice.status {
                    Some(status) => format!("{} ({})", notice.detail, status),
                    None => notice.detail.clone(),
                };
                Rendered::new("Something went wrong").line(line).line("[Close]")
            }
            None => Rendered::default(),
        }
    }
}
