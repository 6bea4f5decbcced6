//! Stage implementations, one module per step.
//!
//! | Step     | Stages                                           |
//! |----------|--------------------------------------------------|
//! | markup   | `render-template` → `pretty-markup`              |
//! | script   | `resolve-includes` → `minify-js`                 |
//! | style    | `compile-scss` → `autoprefix` → `minify-css`     |
//! | image    | `compress-image` (after the `newer` filter)      |
//! | sprite   | `pack-sprites`                                   |
//! | font     | none (copy)                                      |

pub mod font;
pub mod image;
pub mod markup;
pub mod minify;
pub mod script;
pub mod sprite;
pub mod style;
