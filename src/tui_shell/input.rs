/// Single-line editor with a byte cursor kept on char boundaries.
#[derive(Debug, Default)]
pub(super) struct Input {
    pub(super) buf: String,
    pub(super) cursor: usize,
    pub(super) history: Vec<String>,
    pub(super) history_pos: Option<usize>,
}

impl Input {
    pub(super) fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
        self.history_pos = None;
    }

    pub(super) fn insert_char(&mut self, c: char) {
        self.buf.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub(super) fn backspace(&mut self) {
        let Some((i, _)) = self.buf[..self.cursor].char_indices().next_back() else {
            return;
        };
        self.buf.remove(i);
        self.cursor = i;
    }

    pub(super) fn delete(&mut self) {
        if self.cursor >= self.buf.len() {
            return;
        }
        self.buf.remove(self.cursor);
    }

    pub(super) fn move_left(&mut self) {
        if let Some((i, _)) = self.buf[..self.cursor].char_indices().next_back() {
            self.cursor = i;
        }
    }

    pub(super) fn move_right(&mut self) {
        if let Some(c) = self.buf[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub(super) fn set(&mut self, s: String) {
        self.buf = s;
        self.cursor = self.buf.len();
    }

    /// Takes the line for submission and records it in history.
    pub(super) fn take_line(&mut self) -> String {
        let line = std::mem::take(&mut self.buf);
        self.push_history(&line);
        self.clear();
        line
    }

    pub(super) fn push_history(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if self.history.last().map(|s| s.as_str()) == Some(line) {
            return;
        }
        self.history.push(line.to_string());
        self.history_pos = None;
    }

    pub(super) fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let next = match self.history_pos {
            None => self.history.len().saturating_sub(1),
            Some(i) => i.saturating_sub(1),
        };
        self.history_pos = Some(next);
        self.set(self.history[next].clone());
    }

    pub(super) fn history_down(&mut self) {
        let Some(i) = self.history_pos else {
            return;
        };
        if i + 1 >= self.history.len() {
            self.history_pos = None;
            self.clear();
            return;
        }
        let next = i + 1;
        self.history_pos = Some(next);
        self.set(self.history[next].clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_multibyte_text() {
        let mut input = Input::default();
        for c in "sé!".chars() {
            input.insert_char(c);
        }
        input.move_left();
        input.backspace();
        assert_eq!(input.buf, "s!");
        input.move_right();
        input.insert_char('?');
        assert_eq!(input.buf, "s!?");
    }

    #[test]
    fn history_walks_submitted_lines() {
        let mut input = Input::default();
        input.set("say hi".into());
        assert_eq!(input.take_line(), "say hi");
        input.set("list".into());
        input.take_line();
        input.history_up();
        assert_eq!(input.buf, "list");
        input.history_up();
        assert_eq!(input.buf, "say hi");
        input.history_down();
        input.history_down();
        assert!(input.buf.is_empty());
    }
}
