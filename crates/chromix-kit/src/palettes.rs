//! Palette loading.
//!
//! A palette is assembled from an optional external table of named colors
//! and the built-in standard colors, which always take precedence. Tables are
//! CSV files with a `name` and a `hex` column, read from disk via [`CsvFile`]
//! or fetched via [`RemoteCsv`].

use std::path::{Path, PathBuf};

use chromix::diag::{EcoString, StrResult, bail, eco_format};
use chromix::{Palette, Rgb};

#[cfg(feature = "remote-palettes")]
use {
    crate::downloader::Downloader,
    siphasher::sip128::{Hasher128, SipHasher13},
    std::hash::Hash,
    std::io::{self, Write},
};

/// The table of `dvipsnames` colors used when no other source is configured.
pub const DEFAULT_CSV_URL: &str =
    "https://github.com/cestwc/sharpen/releases/download/v1.0.0/dvipsnames.csv";

/// Something that can produce a palette.
pub trait PaletteProvider {
    /// Loads the palette.
    fn load(&self) -> StrResult<Palette>;
}

impl<T: PaletteProvider + ?Sized> PaletteProvider for Box<T> {
    fn load(&self) -> StrResult<Palette> {
        (**self).load()
    }
}

/// The base colors every `xcolor` installation defines.
#[derive(Debug, Default, Copy, Clone)]
pub struct StandardColors;

impl StandardColors {
    /// The colors with their RGB definitions.
    pub const RGB: [(&str, Rgb); 19] = [
        ("red", Rgb::new(1.0, 0.0, 0.0)),
        ("green", Rgb::new(0.0, 1.0, 0.0)),
        ("blue", Rgb::new(0.0, 0.0, 1.0)),
        ("cyan", Rgb::new(0.0, 1.0, 1.0)),
        ("magenta", Rgb::new(1.0, 0.0, 1.0)),
        ("yellow", Rgb::new(1.0, 1.0, 0.0)),
        ("black", Rgb::new(0.0, 0.0, 0.0)),
        ("white", Rgb::new(1.0, 1.0, 1.0)),
        ("gray", Rgb::new(0.5, 0.5, 0.5)),
        ("darkgray", Rgb::new(0.25, 0.25, 0.25)),
        ("lightgray", Rgb::new(0.75, 0.75, 0.75)),
        ("brown", Rgb::new(0.75, 0.5, 0.25)),
        ("lime", Rgb::new(0.75, 1.0, 0.0)),
        ("olive", Rgb::new(0.5, 0.5, 0.0)),
        ("orange", Rgb::new(1.0, 0.5, 0.0)),
        ("pink", Rgb::new(1.0, 0.75, 0.75)),
        ("purple", Rgb::new(0.75, 0.0, 0.25)),
        ("teal", Rgb::new(0.0, 0.5, 0.5)),
        ("violet", Rgb::new(0.5, 0.0, 0.5)),
    ];

    /// The standard colors as a palette.
    pub fn palette() -> Palette {
        Self::RGB.iter().map(|&(name, rgb)| (name, rgb.to_cmyk())).collect()
    }
}

impl PaletteProvider for StandardColors {
    fn load(&self) -> StrResult<Palette> {
        Ok(Self::palette())
    }
}

/// Parses a CSV table of named hex colors.
///
/// The header must contain a `name` and a `hex` column. Header names are
/// matched case-insensitively after trimming, other columns are ignored.
/// Rows with a missing field, a malformed hex value or an unusable name are
/// skipped.
pub fn parse_csv(data: &[u8]) -> StrResult<Palette> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|err| eco_format!("failed to read palette header ({err})"))?
        .clone();
    let column = |key: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(key));
    let (Some(name_col), Some(hex_col)) = (column("name"), column("hex")) else {
        bail!("palette table must have a `name` and a `hex` column");
    };

    let mut palette = Palette::new();
    for (i, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!(row = i + 1, "skipping unreadable row ({err})");
                continue;
            }
        };

        let (Some(name), Some(hex)) = (record.get(name_col), record.get(hex_col)) else {
            tracing::debug!(row = i + 1, "skipping incomplete row");
            continue;
        };

        let rgb = match hex.trim_start_matches('#').parse::<Rgb>() {
            Ok(rgb) => rgb,
            Err(err) => {
                tracing::debug!(row = i + 1, "skipping `{name}`: {err}");
                continue;
            }
        };

        if let Err(err) = palette.insert(name, rgb.to_cmyk()) {
            tracing::debug!(row = i + 1, "skipping row: {err}");
        }
    }

    Ok(palette)
}

/// A palette table stored on the local file system.
#[derive(Debug, Clone)]
pub struct CsvFile(PathBuf);

impl CsvFile {
    /// Creates a provider reading the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The path of the table.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl PaletteProvider for CsvFile {
    fn load(&self) -> StrResult<Palette> {
        let data = std::fs::read(&self.0).map_err(|err| {
            eco_format!("failed to read palette table {} ({err})", self.0.display())
        })?;
        let palette = parse_csv(&data)?;
        tracing::info!(
            path = %self.0.display(),
            colors = palette.len(),
            "loaded palette table"
        );
        Ok(palette)
    }
}

/// A directory holding downloaded palette tables.
///
/// Each table is stored under a file name derived from a hash of its URL.
#[cfg(feature = "remote-palettes")]
#[derive(Debug, Clone)]
pub struct PaletteCache(PathBuf);

#[cfg(feature = "remote-palettes")]
impl PaletteCache {
    /// Creates a cache in the given directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Tries to provide a cache in the standard system cache directory.
    ///
    /// This is:
    /// - `$XDG_CACHE_HOME/chromix/palettes` or `~/.cache/chromix/palettes` on Linux
    /// - `~/Library/Caches/chromix/palettes` on macOS
    /// - `%LOCALAPPDATA%/chromix/palettes` on Windows
    #[cfg(feature = "system-palettes")]
    pub fn system() -> Option<Self> {
        dirs::cache_dir().map(|dir| Self::new(dir.join("chromix/palettes")))
    }

    /// The directory of the cache.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Where the table downloaded from `url` is stored.
    pub fn file(&self, url: &str) -> PathBuf {
        let mut state = SipHasher13::new();
        url.hash(&mut state);
        let hash = state.finish128().as_u128();
        self.0.join(format!("{hash:032x}.csv"))
    }

    /// The cached table for `url`, if there is one.
    pub fn read(&self, url: &str) -> Option<Vec<u8>> {
        std::fs::read(self.file(url)).ok()
    }

    /// Stores the table for `url`.
    ///
    /// The data is written to a temporary file next to its destination first
    /// and then moved into place, so concurrent readers never see a partial
    /// table.
    pub fn store(&self, url: &str, data: &[u8]) -> io::Result<()> {
        std::fs::create_dir_all(&self.0)?;
        let mut file = tempfile::NamedTempFile::new_in(&self.0)?;
        file.write_all(data)?;
        file.persist(self.file(url)).map_err(|err| err.error)?;
        Ok(())
    }
}

/// A palette table fetched from the network.
///
/// Tables are served from the cache if present. Freshly downloaded tables
/// are stored in the cache once they parse successfully. Invokes the
/// downloader with the URL (an [`EcoString`]) as key.
#[cfg(feature = "remote-palettes")]
pub struct RemoteCsv {
    url: EcoString,
    downloader: Box<dyn Downloader>,
    cache: Option<PaletteCache>,
}

#[cfg(feature = "remote-palettes")]
impl RemoteCsv {
    /// Creates a provider for the table at `url` without a cache.
    pub fn new(downloader: impl Downloader, url: impl Into<EcoString>) -> Self {
        Self { url: url.into(), downloader: Box::new(downloader), cache: None }
    }

    /// Keeps downloaded tables in the given cache.
    pub fn with_cache(mut self, cache: Option<PaletteCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The URL of the table.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn download(&self) -> StrResult<Vec<u8>> {
        tracing::info!(url = %self.url, "downloading palette table");
        self.downloader.download(&self.url, &self.url).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                eco_format!("palette table not found at {}", self.url)
            } else {
                eco_format!("failed to download palette table ({err})")
            }
        })
    }
}

#[cfg(feature = "remote-palettes")]
impl PaletteProvider for RemoteCsv {
    fn load(&self) -> StrResult<Palette> {
        if let Some(cache) = &self.cache
            && let Some(data) = cache.read(&self.url)
        {
            tracing::info!(url = %self.url, "using cached palette table");
            return parse_csv(&data);
        }

        let data = self.download()?;
        let palette = parse_csv(&data)?;
        tracing::info!(colors = palette.len(), "downloaded palette table");

        if let Some(cache) = &self.cache
            && let Err(err) = cache.store(&self.url, &data)
        {
            tracing::warn!("failed to cache palette table ({err})");
        }

        Ok(palette)
    }
}

#[cfg(feature = "remote-palettes")]
impl std::fmt::Debug for RemoteCsv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCsv")
            .field("url", &self.url)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// The palette the CLI searches with.
///
/// Loads the external table if there is one and puts the standard colors on
/// top. If the table cannot be loaded, a warning is logged and only the
/// standard colors are used.
pub struct SystemPalette {
    external: Option<Box<dyn PaletteProvider>>,
}

impl SystemPalette {
    /// Combines the given table with the standard colors.
    pub fn new(external: impl PaletteProvider + 'static) -> Self {
        Self { external: Some(Box::new(external)) }
    }

    /// Uses only the standard colors.
    pub fn offline() -> Self {
        Self { external: None }
    }
}

impl SystemPalette {
    /// Loads the palette, also returning the error that made the external
    /// table unusable, if any.
    pub fn load_with_fallback(&self) -> (Palette, Option<EcoString>) {
        let (mut palette, failure) = match &self.external {
            Some(external) => match external.load() {
                Ok(palette) => (palette, None),
                Err(err) => (Palette::new(), Some(err)),
            },
            None => (Palette::new(), None),
        };
        palette.overlay(&StandardColors::palette());
        (palette, failure)
    }
}

impl PaletteProvider for SystemPalette {
    fn load(&self) -> StrResult<Palette> {
        let (palette, failure) = self.load_with_fallback();
        if let Some(err) = failure {
            tracing::warn!(
                "could not load palette table ({err}), using base colors only"
            );
        }
        Ok(palette)
    }
}

#[cfg(test)]
mod tests {
    use chromix::Cmyk;

    use super::*;

    const TABLE: &str = "\
 Name , HEX ,Model
Apricot,FBB982,cmyk
Aquamarine,#00B5BE,cmyk
Broken,12345,cmyk
Bad,GG0000,cmyk
,FFFFFF,cmyk
red!50,FF0000,cmyk
red,000000,cmyk
Short
";

    #[test]
    fn test_parse_csv() {
        let palette = parse_csv(TABLE.as_bytes()).unwrap();
        let names: Vec<_> = palette.names().map(|n| n.as_str()).collect();
        assert_eq!(names, ["Apricot", "Aquamarine", "red"]);
        assert_eq!(palette.get("red"), Some(Cmyk::BLACK));

        let aquamarine = "#00B5BE".parse::<Rgb>().unwrap().to_cmyk();
        assert_eq!(palette.get("Aquamarine"), Some(aquamarine));
    }

    #[test]
    fn test_parse_csv_missing_columns() {
        assert!(parse_csv(b"name,color\nred,FF0000\n").is_err());
        assert!(parse_csv(b"").is_err());
        assert!(parse_csv(b"name,hex\n").unwrap().is_empty());
    }

    #[test]
    fn test_standard_colors() {
        let palette = StandardColors::palette();
        assert_eq!(palette.len(), 19);
        assert_eq!(palette.get("white"), Some(Cmyk::WHITE));
        assert_eq!(palette.get("black"), Some(Cmyk::BLACK));
        assert_eq!(palette.get("gray"), Some(Cmyk::new(0.0, 0.0, 0.0, 0.5)));
        assert_eq!(palette.get("red"), Some(Cmyk::new(0.0, 1.0, 1.0, 0.0)));
        assert!(!palette.contains("White"));
    }

    #[test]
    fn test_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colors.csv");
        std::fs::write(&path, "name,hex\nWhite,FFFFFF\n").unwrap();

        let palette = CsvFile::new(&path).load().unwrap();
        assert_eq!(palette.get("White"), Some(Cmyk::WHITE));

        let missing = CsvFile::new(dir.path().join("missing.csv"));
        assert!(missing.load().unwrap_err().starts_with("failed to read palette table"));
    }

    struct Failing;

    impl PaletteProvider for Failing {
        fn load(&self) -> StrResult<Palette> {
            bail!("unreachable host")
        }
    }

    #[test]
    fn test_system_palette_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colors.csv");
        std::fs::write(&path, "name,hex\nred,000000\nWhite,FFFFFF\n").unwrap();

        let palette = SystemPalette::new(CsvFile::new(&path)).load().unwrap();
        assert_eq!(palette.len(), 20);
        assert_eq!(palette.names().next().map(|n| n.as_str()), Some("red"));
        assert_eq!(palette.get("red"), Some(Cmyk::new(0.0, 1.0, 1.0, 0.0)));
        assert_eq!(palette.get("White"), Some(Cmyk::WHITE));
    }

    #[test]
    fn test_system_palette_fallback() {
        let palette = SystemPalette::new(Failing).load().unwrap();
        assert_eq!(palette, StandardColors::palette());
        assert_eq!(SystemPalette::offline().load().unwrap(), StandardColors::palette());

        let (palette, failure) = SystemPalette::new(Failing).load_with_fallback();
        assert_eq!(palette.len(), 19);
        assert_eq!(failure.as_deref(), Some("unreachable host"));
        assert_eq!(SystemPalette::offline().load_with_fallback().1, None);
    }

    #[cfg(feature = "remote-palettes")]
    mod remote {
        use std::any::Any;
        use std::io::{self, Cursor, Read};
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        use chromix::Cmyk;
        use chromix::diag::EcoString;

        use crate::downloader::Downloader;
        use crate::palettes::{
            DEFAULT_CSV_URL, PaletteCache, PaletteProvider, RemoteCsv,
        };

        /// Serves a fixed body and counts requests.
        #[derive(Clone)]
        struct Canned {
            body: Option<&'static str>,
            hits: Arc<AtomicUsize>,
        }

        impl Canned {
            fn new(body: Option<&'static str>) -> Self {
                Self { body, hits: Arc::default() }
            }

            fn hits(&self) -> usize {
                self.hits.load(Ordering::SeqCst)
            }
        }

        impl Downloader for Canned {
            fn stream(
                &self,
                key: &dyn Any,
                url: &str,
            ) -> io::Result<(Option<usize>, Box<dyn Read>)> {
                let key = key.downcast_ref::<EcoString>();
                assert_eq!(key.map(|k| k.as_str()), Some(url));
                self.hits.fetch_add(1, Ordering::SeqCst);
                match self.body {
                    Some(body) => Ok((Some(body.len()), Box::new(Cursor::new(body)))),
                    None => Err(io::ErrorKind::NotFound.into()),
                }
            }
        }

        const URL: &str = "https://example.com/colors.csv";

        #[test]
        fn test_remote_without_cache() {
            let downloader = Canned::new(Some("name,hex\nWhite,FFFFFF\n"));
            let remote = RemoteCsv::new(downloader.clone(), URL);
            assert_eq!(remote.load().unwrap().len(), 1);
            assert_eq!(remote.load().unwrap().len(), 1);
            assert_eq!(downloader.hits(), 2);
        }

        #[test]
        fn test_remote_uses_cache() {
            let dir = tempfile::tempdir().unwrap();
            let cache = PaletteCache::new(dir.path().join("palettes"));

            let downloader = Canned::new(Some("name,hex\nWhite,FFFFFF\n"));
            let remote =
                RemoteCsv::new(downloader.clone(), URL).with_cache(Some(cache.clone()));
            assert_eq!(remote.load().unwrap().get("White"), Some(Cmyk::WHITE));
            assert_eq!(downloader.hits(), 1);
            assert!(cache.file(URL).exists());

            let offline = Canned::new(None);
            let remote = RemoteCsv::new(offline.clone(), URL).with_cache(Some(cache));
            assert_eq!(remote.load().unwrap().get("White"), Some(Cmyk::WHITE));
            assert_eq!(offline.hits(), 0);
        }

        #[test]
        fn test_remote_errors_are_not_cached() {
            let dir = tempfile::tempdir().unwrap();
            let cache = PaletteCache::new(dir.path());

            let remote =
                RemoteCsv::new(Canned::new(None), URL).with_cache(Some(cache.clone()));
            let err = remote.load().unwrap_err();
            assert_eq!(err.as_str(), format!("palette table not found at {URL}"));

            let remote = RemoteCsv::new(Canned::new(Some("<html>")), URL)
                .with_cache(Some(cache.clone()));
            assert!(remote.load().is_err());
            assert!(!cache.file(URL).exists());
        }

        #[test]
        fn test_cache_file_names() {
            let cache = PaletteCache::new("cache");
            assert_eq!(cache.file(URL), cache.file(URL));
            assert_ne!(cache.file(URL), cache.file(DEFAULT_CSV_URL));
            let name = cache.file(URL);
            let name = name.file_name().unwrap().to_string_lossy();
            assert_eq!(name.len(), 36);
            assert!(name.ends_with(".csv"));
        }
    }
}
