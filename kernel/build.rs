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

//! Reads `config.toml` at the workspace root and turns its `[debug]`
//! section into `cargo:rustc-cfg` flags, mirroring the teacher's
//! `build_impl::config` step.

use serde::Deserialize;
use std::fs;

const CONFIG_PATH: &str = "../config.toml";

#[derive(Deserialize)]
struct ConfigDebug {
	zero_on_alloc: bool,
	bitmap_debug_assertions: bool,
	ring_buffer_panic_on_overflow: bool,
}

#[derive(Deserialize)]
struct Config {
	debug: ConfigDebug,
}

fn main() {
	println!("cargo:rerun-if-changed={CONFIG_PATH}");
	let config_str = fs::read_to_string(CONFIG_PATH).unwrap_or_default();
	let config: Config = toml::from_str(&config_str).unwrap_or(Config {
		debug: ConfigDebug {
			zero_on_alloc: true,
			bitmap_debug_assertions: true,
			ring_buffer_panic_on_overflow: false,
		},
	});
	if config.debug.zero_on_alloc {
		println!("cargo:rustc-cfg=config_debug_zero_on_alloc");
	}
	if config.debug.bitmap_debug_assertions {
		println!("cargo:rustc-cfg=config_debug_bitmap_assertions");
	}
	if config.debug.ring_buffer_panic_on_overflow {
		println!("cargo:rustc-cfg=config_debug_ring_buffer_panic");
	}
}
