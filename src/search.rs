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

//! Relevance weighting for search strings.
//!
//! Presenters do not decide what matches a search: they ask a
//! [`SearchProvider`] for a weight per track and rank their items by it. A
//! track missing from the returned map has weight zero.

use std::{collections::HashMap, sync::Arc};

use crate::model::{DatabaseIndex, Track};

pub type Weight = u32;

/// Which list a search comes from, so the provider can pick the fields that
/// make sense for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchContext {
    Tracks,
    Albums,
    Playlists,
    Artists,
    Genres,
    Publishers,
    Years,
    Folders,
    Formats,
    Discs,
}

pub trait SearchProvider {
    fn filter_tracks(
        &self,
        search: &str,
        tracks: &[Arc<Track>],
        context: SearchContext,
    ) -> HashMap<DatabaseIndex, Weight>;
}

const TITLE_WEIGHT: Weight = 4;
const ARTIST_WEIGHT: Weight = 3;
const ALBUM_WEIGHT: Weight = 2;
const TAG_WEIGHT: Weight = 1;

/// Case-insensitive substring search over track metadata.
///
/// The search string is split on whitespace and every word must match some
/// field of a track for it to be kept. Each matching field adds its weight,
/// doubled when the word equals the whole field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextSearch;

impl TextSearch {
    fn fields(track: &Track, context: SearchContext) -> Vec<(String, Weight)> {
        let mut fields = Vec::new();
        let mut push = |text: &str, weight: Weight| {
            if !text.is_empty() {
                fields.push((text.to_lowercase(), weight));
            }
        };

        match context {
            SearchContext::Tracks | SearchContext::Playlists => {
                push(&track.title, TITLE_WEIGHT);
                for artist in &track.artists {
                    push(&artist.name, ARTIST_WEIGHT);
                }
                push(track.album_title(), ALBUM_WEIGHT);
                push(track.album_artist_name(), ALBUM_WEIGHT);
                for genre in &track.genres {
                    push(&genre.name, TAG_WEIGHT);
                }
                push(track.publisher_name(), TAG_WEIGHT);
            }
            SearchContext::Albums | SearchContext::Discs => {
                push(track.album_title(), TITLE_WEIGHT);
                push(track.album_artist_name(), ARTIST_WEIGHT);
            }
            SearchContext::Artists => {
                for artist in &track.artists {
                    push(&artist.name, TITLE_WEIGHT);
                }
            }
            SearchContext::Genres => {
                for genre in &track.genres {
                    push(&genre.name, TITLE_WEIGHT);
                }
            }
            SearchContext::Publishers => push(track.publisher_name(), TITLE_WEIGHT),
            SearchContext::Years => {
                if let Some(year) = track.effective_year() {
                    push(&year.to_string(), TITLE_WEIGHT);
                }
            }
            SearchContext::Folders => {
                if let Some(folder) = track.folder() {
                    push(&folder.to_string_lossy(), TITLE_WEIGHT);
                }
            }
            SearchContext::Formats => {
                if let Some(ext) = track.extension() {
                    push(&ext, TITLE_WEIGHT);
                }
            }
        }

        fields
    }

    fn weigh(words: &[String], fields: &[(String, Weight)]) -> Weight {
        let mut total = 0;
        for word in words {
            let word_weight: Weight = fields
                .iter()
                .filter(|(text, _)| text.contains(word.as_str()))
                .map(|(text, weight)| if text == word { weight * 2 } else { *weight })
                .sum();
            if word_weight == 0 {
                return 0;
            }
            total += word_weight;
        }
        total
    }
}

impl SearchProvider for TextSearch {
    fn filter_tracks(
        &self,
        search: &str,
        tracks: &[Arc<Track>],
        context: SearchContext,
    ) -> HashMap<DatabaseIndex, Weight> {
        let words: Vec<String> = search.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return HashMap::new();
        }

        tracks
            .iter()
            .filter_map(|track| {
                let weight = Self::weigh(&words, &Self::fields(track, context));
                (weight > 0).then_some((track.id, weight))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;

    #[test]
    fn test_every_word_must_match() {
        let mut a = track(1, "Blue in Green");
        a.artists = vec![artist(1, "Miles Davis")];
        let b = track(2, "Green Onions");
        let tracks = vec![shared(a), shared(b)];

        let weights = TextSearch.filter_tracks("green miles", &tracks, SearchContext::Tracks);

        assert_eq!(weights.len(), 1);
        assert_eq!(weights.get(&1), Some(&(TITLE_WEIGHT + ARTIST_WEIGHT)));
    }

    #[test]
    fn test_whole_field_match_weighs_double() {
        let tracks = titled(&[(1, "Intro"), (2, "Intro (Reprise)")]);

        let weights = TextSearch.filter_tracks("INTRO", &tracks, SearchContext::Tracks);

        assert_eq!(weights[&1], TITLE_WEIGHT * 2);
        assert_eq!(weights[&2], TITLE_WEIGHT);
    }

    #[test]
    fn test_context_limits_fields() {
        let mut a = track(1, "Jazz Standard");
        a.genres = vec![std::sync::Arc::new(crate::model::Genre { id: 1, name: "Rock".into() })];
        let tracks = vec![shared(a)];

        assert!(TextSearch.filter_tracks("jazz", &tracks, SearchContext::Genres).is_empty());
        assert_eq!(TextSearch.filter_tracks("rock", &tracks, SearchContext::Genres).len(), 1);
    }

    #[test]
    fn test_blank_search_matches_nothing() {
        let tracks = titled(&[(1, "a")]);
        assert!(TextSearch.filter_tracks("   ", &tracks, SearchContext::Tracks).is_empty());
    }
}
