//! This module contains the symbols of the surface language.
//! These constants are used when we prettyprint codes, relations and patterns.

// Symbols
//
//

/// The symbol `$`, prefix of code references and code definitions
pub const DOLLAR: &str = "$";

/// The symbol `.`
pub const DOT: &str = ".";

/// The symbol `?`, prefix of filters
pub const QUESTION_MARK: &str = "?";

/// The symbol `,`
pub const COMMA: &str = ",";

/// The symbol `=`
pub const EQ: &str = "=";

/// The symbol `;`
pub const SEMI: &str = ";";

/// The symbol `...`, marks an open field list
pub const ELLIPSIS: &str = "...";

/// The symbol `->`
pub const ARROW: &str = "->";

/// The symbol `#`, prefix of pattern ids
pub const HASH: &str = "#";

/// The symbol `()`, the identity relation
pub const UNIT: &str = "()";

// Keywords
//
//

/// The keyword `true`
pub const TRUE: &str = "true";

/// The keyword `false`
pub const FALSE: &str = "false";
