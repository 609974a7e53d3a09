use super::*;

pub(super) fn saves(app: &mut App, key: KeyEvent) {
    if let Some(filter) = app.filter_input.as_mut() {
        match key.code {
            KeyCode::Esc => {
                app.filter_input = None;
                app.session.set_filter("");
            }
            KeyCode::Enter => app.filter_input = None,
            KeyCode::Backspace => {
                filter.backspace();
                let text = filter.buf.clone();
                app.session.set_filter(text);
            }
            KeyCode::Char(c) => {
                filter.insert_char(c);
                let text = filter.buf.clone();
                app.session.set_filter(text);
            }
            KeyCode::Up => app.session.select_step(false),
            KeyCode::Down => app.session.select_step(true),
            _ => {}
        }
        return;
    }

    let actions = app.session.actions();
    match key.code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Esc => {
            if app.session.selected_name().is_some() {
                app.session.deselect();
            } else if !app.session.filter().is_empty() {
                app.session.set_filter("");
            } else {
                app.back();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.session.select_step(false),
        KeyCode::Down | KeyCode::Char('j') => app.session.select_step(true),
        KeyCode::Char('/') => {
            let mut input = Input::default();
            input.set(app.session.filter().to_string());
            app.filter_input = Some(input);
        }
        KeyCode::Char('r') => app.session.reload(),
        KeyCode::Char('n') => app.open(Screen::Create),
        KeyCode::Char('e') if actions.modify => app.open(Screen::Modify),
        KeyCode::Char('d') if actions.delete => app.open(Screen::Delete),
        KeyCode::Char('c') | KeyCode::Enter if actions.console => app.open(Screen::Console),
        KeyCode::Char('s') => {
            app.session.toggle_play();
        }
        _ => {}
    }
}

pub(super) fn create(app: &mut App, key: KeyEvent) {
    if app.session.is_busy() && key.code != KeyCode::Esc {
        return;
    }
    let on_version_row =
        app.session.create_form().focus() == crate::session::forms::CreateRow::Version;
    let takes_text = app.session.create_form().focus_takes_text();
    match key.code {
        KeyCode::Esc => app.back(),
        KeyCode::Enter => {
            app.session.submit_create();
        }
        KeyCode::Tab | KeyCode::Down => app.session.create_form_mut().move_focus(true),
        KeyCode::BackTab | KeyCode::Up => app.session.create_form_mut().move_focus(false),
        KeyCode::Char('v') if on_version_row => {
            app.session.pick_create_version();
        }
        KeyCode::Left => app.session.create_form_mut().cycle(false),
        KeyCode::Right => app.session.create_form_mut().cycle(true),
        KeyCode::Char(' ') if !takes_text => app.session.create_form_mut().cycle(true),
        KeyCode::Char(c) => app.session.create_form_mut().insert_char(c),
        KeyCode::Backspace => app.session.create_form_mut().backspace(),
        _ => {}
    }
}

pub(super) fn modify(app: &mut App, key: KeyEvent) {
    if app.session.is_busy() && key.code != KeyCode::Esc {
        return;
    }
    let takes_text = app.session.modify_form().focus_takes_text();
    match key.code {
        KeyCode::Esc => app.back(),
        KeyCode::Enter => {
            app.session.submit_modify();
        }
        KeyCode::Tab | KeyCode::Down => app.session.modify_form_mut().move_focus(true),
        KeyCode::BackTab | KeyCode::Up => app.session.modify_form_mut().move_focus(false),
        KeyCode::Left => app.session.modify_form_mut().cycle(false),
        KeyCode::Right => app.session.modify_form_mut().cycle(true),
        KeyCode::Char(' ') if !takes_text => app.session.modify_form_mut().cycle(true),
        KeyCode::Char(c) => app.session.modify_form_mut().insert_char(c),
        KeyCode::Backspace => app.session.modify_form_mut().backspace(),
        _ => {}
    }
}

pub(super) fn delete(app: &mut App, key: KeyEvent) {
    if app.session.is_busy() && key.code != KeyCode::Esc {
        return;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char('y') => {
            app.session.confirm_delete();
        }
        KeyCode::Esc | KeyCode::Char('n') => app.back(),
        _ => {}
    }
}

pub(super) fn console(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.back(),
        KeyCode::Enter => {
            let line = app.command.take_line();
            app.session.send_command(&line);
            app.console_scroll = 0;
        }
        KeyCode::PageUp => {
            let max = app.console_lines();
            app.console_scroll = (app.console_scroll + 10).min(max);
        }
        KeyCode::PageDown => app.console_scroll = app.console_scroll.saturating_sub(10),
        KeyCode::End => app.console_scroll = 0,
        KeyCode::Up => app.command.history_up(),
        KeyCode::Down => app.command.history_down(),
        KeyCode::Left => app.command.move_left(),
        KeyCode::Right => app.command.move_right(),
        KeyCode::Backspace => app.command.backspace(),
        KeyCode::Delete => app.command.delete(),
        KeyCode::Char(c) => app.command.insert_char(c),
        _ => {}
    }
}

pub(super) fn version(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.session.finish_version_pick(None),
        KeyCode::Enter => app.session.choose_version(),
        KeyCode::Up | KeyCode::Char('k') => app.session.move_version_cursor(false),
        KeyCode::Down | KeyCode::Char('j') => app.session.move_version_cursor(true),
        _ => {}
    }
}
