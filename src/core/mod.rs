// ─── mcmirror Core ───
// Mirror-aware installer and launch command builder.
//
// Architecture:
//   core/
//     source      — Download sources and per-artifact host rewriting
//     http        — Fetch/post transport (reqwest)
//     downloader/ — Hash-verified downloads, worker pool, rate limiter
//     version/    — Manifest, descriptor, rules, resolver
//     install/    — Installation session + library installer
//     assets/     — Asset index + object downloads
//     auth/       — Offline and yggdrasil accounts
//     launch/     — Classpath, argument substitution, command synthesis
//     config      — Local settings file

pub mod assets;
pub mod auth;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod install;
pub mod launch;
pub mod source;
pub mod version;

#[cfg(test)]
pub mod testing;
