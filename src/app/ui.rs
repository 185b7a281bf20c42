use crate::app::state::AppState;
use crate::components::host_screen::HostScreen;
use crate::components::modals::{dim_area, PaletteModal, ToastView};

use ratatui::Frame;

pub fn draw(f: &mut Frame, app_state: &AppState) {
    let area = f.area();
    if area.width == 0 || area.height == 0 {
        return;
    }
    let theme = &app_state.theme;

    f.render_widget(HostScreen { theme, app_state }, area);

    if let Some(palette) = &app_state.palette {
        dim_area(f.buffer_mut(), area);
        f.render_widget(
            PaletteModal {
                theme,
                app_state,
                palette,
            },
            area,
        );
    }

    if let Some(toast) = &app_state.toast {
        f.render_widget(ToastView { theme, toast }, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::PaletteState;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_open_palette_lists_commands() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut state = AppState::default();
        state.palette = Some(PaletteState::new(None));
        terminal.draw(|f| draw(f, &state)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("SPOTLIGHT"));
        assert!(text.contains("Open Record"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(3, 2)).unwrap();
        let mut state = AppState::default();
        state.palette = Some(PaletteState::new(Some("tip".to_string())));
        state.show_toast("Hello");
        terminal.draw(|f| draw(f, &state)).unwrap();
    }
}
