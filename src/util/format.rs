// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Value converters for display.
//!
//! Everything here turns raw model values into the strings shown in list
//! rows, capsules and the status line. None of these functions fail; absent
//! values become empty strings.

use std::sync::Arc;

use crate::model::{Rating, Track};

/// Formats a duration in seconds into a `MM:SS` string.
///
/// This is used for the fixed-width duration column of track rows.
///
/// # Examples
///
/// ```
/// use shelf::util::format::format_time;
///
/// assert_eq!(format_time(65), "01:05");
/// assert_eq!(format_time(3600), "60:00");
/// ```
pub fn format_time(total_seconds: u64) -> String {
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// Formats a duration as `M:SS`, or `H:MM:SS` once it reaches an hour.
///
/// Used for totals, where the length of the string does not matter.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

pub fn track_count(count: usize) -> String {
    match count {
        1 => "1 track".to_string(),
        n => format!("{n} tracks"),
    }
}

/// Count and total length of a set of tracks, as shown in the status line.
pub fn tracks_summary(tracks: &[Arc<Track>]) -> String {
    if tracks.is_empty() {
        return String::new();
    }
    let total: u64 = tracks.iter().map(|t| t.duration).sum();
    format!("{}, {}", track_count(tracks.len()), format_duration(total))
}

/// Every credited artist of a track, comma separated.
pub fn artist_names(track: &Track) -> String {
    track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_default()
}

pub fn format_rating(rating: Rating) -> &'static str {
    match rating {
        Rating::Dislike => "-",
        Rating::Neutral => "",
        Rating::Like => "+",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3600), "60:00");
    }

    #[test]
    fn test_format_duration_switches_to_hours() {
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(360), "6:00");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[test]
    fn test_track_count_pluralises() {
        assert_eq!(track_count(0), "0 tracks");
        assert_eq!(track_count(1), "1 track");
        assert_eq!(track_count(12), "12 tracks");
    }

    #[test]
    fn test_tracks_summary() {
        assert_eq!(tracks_summary(&[]), "");
        assert_eq!(tracks_summary(&titled(&[(1, "a"), (2, "b")])), "2 tracks, 6:00");
    }

    #[test]
    fn test_artist_names_joins_every_artist() {
        let mut t = track(1, "x");
        assert_eq!(artist_names(&t), "");
        t.artists = vec![artist(1, "Simon"), artist(2, "Garfunkel")];
        assert_eq!(artist_names(&t), "Simon, Garfunkel");
    }
}
