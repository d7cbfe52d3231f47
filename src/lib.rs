//! Worship setlist generation: picks songs for each moment of a service,
//! balancing tag weight against how recently each song was played, then
//! orders them into an energy arc.
//!
//! Core modules:
//! - [`algorithm`] - Candidate scoring and per-moment selection
//! - [`recency`] - Exponential-decay freshness scores from service history
//! - [`ordering`] - Energy sequencing within a moment
//! - [`generator`] - Whole-setlist generation
//! - [`replacer`] - Replacing songs in, and deriving variants of, a setlist
//!
//! ### Supporting Modules
//!
//! - [`song`] - Song records and the song library
//! - [`setlist`] - Setlists and history entries
//! - [`tags`] - Parsing `moment(weight)` tag strings
//! - [`event_type`] - Service kinds with their own moment layouts
//! - [`config`] - Generation tunables and JSON config files
//! - [`error`] - Error taxonomy
//!
//! ## Quick Start Example
//!
//! ```
//! use setlister::generator::{Overrides, SetlistGenerator};
//! use setlister::song::{library_from, Song};
//! use setlister::tags::parse_tags;
//! use chrono::NaiveDate;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut song = Song::new("Oceanos");
//! song.tags = parse_tags("louvor(5), prelúdio", 3)?;
//! let songs = library_from(vec![
//!     song,
//!     Song::new("Santo").with_tag("louvor", 3).with_energy(1.0),
//!     Song::new("Grande É o Senhor").with_tag("poslúdio", 4),
//! ]);
//!
//! let generator = SetlistGenerator::new(&songs, &[]);
//! let date = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! // Default layout; moments without enough songs are left short
//! let setlist = generator.generate_default(date, &Overrides::new(), &mut rng)?;
//! assert!(setlist.has_unique_titles());
//! assert_eq!(setlist.songs("poslúdio"), ["Grande É o Senhor"]);
//!
//! // Swap one random slot for the best remaining candidate
//! let variant = generator.derive_setlist(&setlist, Some(1), &mut rng)?;
//! assert_eq!(variant.date, setlist.date);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Algorithm Details
//!
//! ### Scoring
//! - `score = weight * (recency + 0.1) + U(0, 0.5)`
//! - Weight comes from the song's tag for the moment (1-10)
//! - Recency is `1 - exp(-days / decay_days)`, 1.0 for never-used songs
//! - Only services strictly before the target date count as uses
//!
//! ### Generation
//! - Moments are filled in configuration order
//! - Overrides take the first slots of their moment, in caller order
//! - No title appears twice in one setlist
//! - Energy ordering sorts only the auto-selected songs
//!
//! ## Randomness
//!
//! Every operation that draws random numbers takes `&mut impl Rng`. Seed a
//! `StdRng` for reproducible setlists.
//!
//! ## Error Handling
//!
//! Core operations return [`error::Result`]. A [`error::ValidationError`]
//! means the request itself was malformed and is raised before anything is
//! chosen; [`error::SetlistError::NoAvailableReplacement`] means the song pool
//! could not satisfy a replacement. Config file loading uses `anyhow` so that
//! I/O and parse failures carry the file path.
//!
//! ## Logging
//!
//! The crate logs through the `log` facade and never installs a logger.
//! Candidate scores are emitted at `trace`, generation steps at `debug`,
//! replacements at `info`, skipped overrides and short moments at `warn`.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod event_type;
pub mod generator;
pub mod ordering;
pub mod recency;
pub mod replacer;
pub mod setlist;
pub mod song;
pub mod tags;

pub use error::{Result, SetlistError, ValidationError};
pub use generator::{GenerationReport, Overrides, SetlistGenerator, Shortfall};
pub use replacer::SlotReplacement;
pub use setlist::{HistoryEntry, MomentConfig, Setlist};
pub use song::{Song, SongLibrary};
