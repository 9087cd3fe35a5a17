use std::{env, error::Error, path::PathBuf};

use log::debug;

use crate::{
    config::RippleConfig,
    feed::{CachingFeed, FeedService},
    snapshot::Snapshot,
    Ripple,
};

#[derive(Default)]
pub struct RippleBuilder {
    // All other paths are relative to `root`
    root: Option<PathBuf>,
    snapshot_file_name: Option<PathBuf>,
    config: Option<RippleConfig>,
}

impl RippleBuilder {
    /// Solution root directory.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Name of the snapshot toml file describing feeds and the solution.
    ///
    /// Defaults to `ripple.toml`.
    pub fn snapshot_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_file_name = Some(path.into());
        self
    }

    /// Defaults to [`RippleConfig::default`].
    pub fn config(mut self, config: RippleConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn try_build(self) -> Result<Ripple, Box<dyn Error>> {
        let Self {
            root,
            snapshot_file_name,
            config,
        } = self;
        let root = match root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let snapshot_file_name = snapshot_file_name.unwrap_or_else(|| PathBuf::from("ripple.toml"));
        let snapshot_path = root.join(snapshot_file_name);

        let config = config.unwrap_or_default();

        let Snapshot { feeds, solution } = Snapshot::from_file(&snapshot_path)?;
        debug!(
            "Loaded solution {} with {} project(s) and {} feed(s)",
            solution.name(),
            solution.projects().len(),
            feeds.len()
        );

        let feeds: Box<dyn FeedService + Send + Sync> = if config.feed_cache {
            Box::new(CachingFeed::new(feeds))
        } else {
            Box::new(feeds)
        };

        Ok(Ripple {
            snapshot_path,
            feeds,
            solution,
            force_updates: config.force_updates,
        })
    }
}
