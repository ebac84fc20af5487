use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::filter::FilterState;
use crate::locale::Locale;
use crate::palette::ColorTag;

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::defaults();

    let rc = resolve_rc_path(
      rc_override
    )?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading almanacrc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no almanacrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[must_use]
  pub fn defaults() -> Self {
    let mut cfg = Config {
      map:          HashMap::new(),
      loaded_files: vec![]
    };

    cfg.map.insert(
      "color".to_string(),
      "on".to_string()
    );
    cfg.map.insert(
      "calendar.locale".to_string(),
      "en".to_string()
    );
    cfg.map.insert(
      "calendar.week_numbers"
        .to_string(),
      "on".to_string()
    );
    cfg
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  /// Filter toggles from `filter.<tag>` keys; unset tags stay visible.
  pub fn filter_defaults(
    &self
  ) -> FilterState {
    let toggles = ColorTag::ALL
      .into_iter()
      .map(|tag| {
        let key =
          format!("filter.{}", tag);
        (
          tag,
          self
            .get_bool(&key)
            .unwrap_or(true)
        )
      });
    FilterState::with_defaults(toggles)
  }

  pub fn locale(
    &self
  ) -> anyhow::Result<Locale> {
    let raw = self
      .get("calendar.locale")
      .unwrap_or_else(|| {
        "en".to_string()
      });
    Locale::from_key(&raw).ok_or_else(
      || {
        anyhow!(
          "unsupported calendar.locale: \
           {raw}"
        )
      }
    )
  }

  pub fn events_path(
    &self
  ) -> Option<PathBuf> {
    self
      .get("calendar.events")
      .filter(|raw| {
        !raw.trim().is_empty()
      })
      .map(|raw| {
        expand_tilde(Path::new(
          raw.trim()
        ))
      })
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if line.is_empty()
        || line.starts_with('#')
      {
        continue;
      }

      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if self
          .loaded_files
          .contains(&include_path)
        {
          warn!(include = %include_path.display(), "include cycle detected; skipping");
        } else if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var("ALMANACRC")
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping \
       ~/.almanacrc"
    );
    return Ok(None);
  };
  let candidate =
    home.join(".almanacrc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rc_file_with_include_sets_filters()
  {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let extra = dir.path().join("extra.rc");
    fs::write(
      &extra,
      "filter.red = off\n"
    )
    .expect("write include");
    let rc = dir.path().join("almanacrc");
    fs::write(
      &rc,
      "# calendar settings\n\
       calendar.locale = ko  # korean\n\
       include extra.rc\n\
       filter.sky=no\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&rc))
      .expect("load config");
    assert_eq!(cfg.loaded_files.len(), 2);
    assert_eq!(
      cfg.locale().expect("locale"),
      Locale::Ko
    );

    let filters = cfg.filter_defaults();
    assert!(
      !filters.is_active(ColorTag::Red)
    );
    assert!(
      !filters.is_active(ColorTag::Sky)
    );
    assert!(
      filters.is_active(ColorTag::Green)
    );
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([(
      "rc.calendar.events".to_string(),
      "/tmp/events.json".to_string()
    )]);
    assert_eq!(
      cfg.events_path(),
      Some(PathBuf::from(
        "/tmp/events.json"
      ))
    );
  }

  #[test]
  fn malformed_line_is_an_error() {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let rc = dir.path().join("almanacrc");
    fs::write(&rc, "no equals here\n")
      .expect("write rc");
    assert!(
      Config::load(Some(&rc)).is_err()
    );
  }
}
