/*
 * This file is part of Yorha.
 *
 * Yorha is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Yorha is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Yorha. If not, see <https://www.gnu.org/licenses/>.
 */

//! The syscall surface (C11, §4.10): a thin dispatcher over the filesystem
//! (C7), the special-file registry (C6), and the FD table (C8).
//!
//! Every failing call records a message in `kernel.error` (C10) at its own
//! site before returning `Err`, so a caller that only cares about the
//! latest failure can read `kernel.error.message()` without threading the
//! `Errno` back through every layer itself.

mod close;
mod create;
mod list_dir;
mod mkdir;
mod open;
mod read;
mod seek;
mod shutdown;
mod timeout;
mod unlink;
mod write;

pub use close::close;
pub use create::create;
pub use list_dir::{list_dir, str_list_dir};
pub use mkdir::mkdir;
pub use open::open;
pub use read::read;
pub use seek::seek;
pub use shutdown::shutdown;
pub use timeout::read_with_timeout;
pub use unlink::unlink;
pub use write::write;
