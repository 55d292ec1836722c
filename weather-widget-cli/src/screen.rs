use std::{
    future::Future,
    io::{self, IsTerminal, Write},
};

use crossterm::{
    cursor, execute,
    terminal::{self, ClearType},
};
use weather_widget_core::{RequestState, WorkflowController};

use crate::card::{RenderOptions, render};

/// Prints widget states to stdout. On a terminal the loading placeholder is
/// overwritten by whatever replaces it.
#[derive(Debug)]
pub struct Screen {
    opts: RenderOptions,
    tty: bool,
    last: Option<RequestState>,
    transient_lines: u16,
}

impl Screen {
    pub fn new(opts: RenderOptions) -> Self {
        Self {
            opts,
            tty: io::stdout().is_terminal(),
            last: None,
            transient_lines: 0,
        }
    }

    pub fn show(&mut self, state: &RequestState) -> io::Result<()> {
        if self.last.as_ref() == Some(state) {
            return Ok(());
        }

        self.clear()?;
        let text = render(state, &self.opts);
        let mut out = io::stdout();
        writeln!(out, "{text}")?;
        out.flush()?;

        if self.tty && state.is_loading() {
            self.transient_lines = u16::try_from(text.lines().count()).unwrap_or(u16::MAX);
        }
        self.last = Some(state.clone());
        Ok(())
    }

    /// Erase the loading placeholder, if one is on screen.
    pub fn clear(&mut self) -> io::Result<()> {
        if self.transient_lines > 0 {
            execute!(
                io::stdout(),
                cursor::MoveUp(self.transient_lines),
                terminal::Clear(ClearType::FromCursorDown)
            )?;
            self.transient_lines = 0;
        }
        Ok(())
    }

    /// Drive `op` to completion, showing each controller state it passes through.
    pub async fn present<T>(
        &mut self,
        controller: &WorkflowController,
        op: impl Future<Output = T>,
    ) -> io::Result<T> {
        let mut updates = controller.subscribe();
        tokio::pin!(op);

        loop {
            tokio::select! {
                biased;
                out = &mut op => {
                    self.show(&controller.state())?;
                    return Ok(out);
                }
                Ok(()) = updates.changed() => {
                    let state = updates.borrow_and_update().state.clone();
                    self.show(&state)?;
                }
            }
        }
    }
}
