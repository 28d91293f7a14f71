//! Chromix Kit contains the building blocks around the search itself: where
//! palettes come from and how they are fetched. It contains the
//! implementations used by `chromix-cli`.
//!
//! # Features flags
//! Functionality that incurs additional dependencies is feature-flagged. By
//! default, all features are disabled. The available feature flags are:
//!
//! - `remote-palettes`: Enables downloading and caching of palette tables via
//!   [`palettes::RemoteCsv`].
//! - `system-palettes`: Enables caching in the standard cache directory via
//!   [`palettes::PaletteCache::system`].
//! - `system-downloader`: Enables network requests via
//!   [`downloader::SystemDownloader`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(all(
        feature = "remote-palettes",
        feature = "system-palettes",
        feature = "system-downloader",
    )),
    allow(rustdoc::broken_intra_doc_links)
)]

pub mod downloader;
pub mod palettes;
