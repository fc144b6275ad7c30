use pretty::{
    DocAllocator,
    termcolor::{Color, ColorSpec},
};

use super::types::*;

const KEYWORD: Color = Color::Magenta;
const LABEL: Color = Color::Green;
const TYPE: Color = Color::Red;
const COMMENT: Color = Color::Cyan;

pub trait ThemeExt<'a> {
    fn keyword(&'a self, text: &'a str) -> Builder<'a>;
    fn label(&'a self, text: String) -> Builder<'a>;
    fn typ(&'a self, text: &'a str) -> Builder<'a>;
    fn comment(&'a self, text: String) -> Builder<'a>;
}

impl<'a> ThemeExt<'a> for Alloc<'a> {
    fn keyword(&'a self, text: &'a str) -> Builder<'a> {
        self.text(text).annotate(KEYWORD.spec())
    }

    fn label(&'a self, text: String) -> Builder<'a> {
        self.text(text).annotate(LABEL.spec())
    }

    fn typ(&'a self, text: &'a str) -> Builder<'a> {
        self.text(text).annotate(TYPE.spec())
    }

    fn comment(&'a self, text: String) -> Builder<'a> {
        self.text(text).annotate(COMMENT.spec())
    }
}

pub trait ColorExt {
    fn spec(self) -> ColorSpec;
}

impl ColorExt for Color {
    fn spec(self) -> ColorSpec {
        ColorSpec::new().set_fg(Some(self)).clone()
    }
}
