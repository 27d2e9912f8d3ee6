//! 한 줄 입력 상태 (UTF-8 경계 기준 커서)

use crossterm::event::{KeyCode, KeyModifiers};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    /// 바이트 위치 (항상 문자 경계)
    cursor: usize,
}

impl TextInput {
    pub fn new(initial: impl Into<String>) -> Self {
        let value = initial.into();
        let cursor = value.len();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn into_value(self) -> String {
        self.value
    }

    /// 편집 키 처리 (처리했으면 true)
    pub fn handle_key(&mut self, modifiers: KeyModifiers, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('w') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.delete_prev_word()
            }
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.replace_range(..self.cursor, "");
                self.cursor = 0;
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.len(),
            _ => return false,
        }
        true
    }

    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.prev_boundary(self.cursor);
        self.value.remove(prev);
        self.cursor = prev;
    }

    fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    fn left(&mut self) {
        self.cursor = self.prev_boundary(self.cursor);
    }

    fn right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// 커서 앞 단어 삭제 (경로 구분자에서 멈춤)
    fn delete_prev_word(&mut self) {
        let end = self.cursor;
        let mut pos = end;
        let before = |pos: usize| self.value[..pos].chars().next_back();

        while before(pos).is_some_and(is_word_delimiter) {
            pos = self.prev_boundary(pos);
        }
        while before(pos).is_some_and(|c| !is_word_delimiter(c)) {
            pos = self.prev_boundary(pos);
        }
        self.value.replace_range(pos..end, "");
        self.cursor = pos;
    }

    fn prev_boundary(&self, pos: usize) -> usize {
        self.value[..pos]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

fn is_word_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '/' | '\\' | '.' | '-' | '_' | ',' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut TextInput, code: KeyCode) {
        input.handle_key(KeyModifiers::NONE, code);
    }

    #[test]
    fn test_insert_and_backspace_utf8() {
        let mut input = TextInput::new("\u{AC00}\u{B098}");
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Char('\u{B2E4}'));
        assert_eq!(input.value(), "\u{AC00}\u{B2E4}\u{B098}");

        press(&mut input, KeyCode::Backspace);
        assert_eq!(input.value(), "\u{AC00}\u{B098}");
        assert_eq!(input.cursor(), "\u{AC00}".len());

        press(&mut input, KeyCode::Home);
        press(&mut input, KeyCode::Delete);
        assert_eq!(input.value(), "\u{B098}");
    }

    #[test]
    fn test_cursor_movement_bounds() {
        let mut input = TextInput::new("ab");
        press(&mut input, KeyCode::Right);
        assert_eq!(input.cursor(), 2);
        press(&mut input, KeyCode::Home);
        press(&mut input, KeyCode::Left);
        assert_eq!(input.cursor(), 0);
        press(&mut input, KeyCode::End);
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_delete_prev_word() {
        let mut input = TextInput::new("/tmp/backup/out");
        input.handle_key(KeyModifiers::CONTROL, KeyCode::Char('w'));
        assert_eq!(input.value(), "/tmp/backup/");
        input.handle_key(KeyModifiers::CONTROL, KeyCode::Char('w'));
        assert_eq!(input.value(), "/tmp/");
    }

    #[test]
    fn test_unhandled_key() {
        let mut input = TextInput::new("x");
        assert!(!input.handle_key(KeyModifiers::NONE, KeyCode::Tab));
        assert!(!input.handle_key(KeyModifiers::CONTROL, KeyCode::Char('z')));
        assert_eq!(input.value(), "x");
    }
}
