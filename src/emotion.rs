//! The fixed emotion vocabulary produced by the analysis service.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Love,
    Hope,
    Nostalgia,
    Loneliness,
    Confidence,
    Despair,
    Excitement,
    Mystery,
    Defiance,
    Gratitude,
    Spirituality,
}

impl Emotion {
    /// Vocabulary order. Ranking ties are broken by this order.
    pub const ALL: [Emotion; 15] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Love,
        Emotion::Hope,
        Emotion::Nostalgia,
        Emotion::Loneliness,
        Emotion::Confidence,
        Emotion::Despair,
        Emotion::Excitement,
        Emotion::Mystery,
        Emotion::Defiance,
        Emotion::Gratitude,
        Emotion::Spirituality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Love => "love",
            Emotion::Hope => "hope",
            Emotion::Nostalgia => "nostalgia",
            Emotion::Loneliness => "loneliness",
            Emotion::Confidence => "confidence",
            Emotion::Despair => "despair",
            Emotion::Excitement => "excitement",
            Emotion::Mystery => "mystery",
            Emotion::Defiance => "defiance",
            Emotion::Gratitude => "gratitude",
            Emotion::Spirituality => "spirituality",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One score per emotion. Deserialization requires every key and rejects
/// unknown ones, so a decoded value always covers the whole vocabulary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmotionScores {
    pub joy: f64,
    pub sadness: f64,
    pub anger: f64,
    pub fear: f64,
    pub love: f64,
    pub hope: f64,
    pub nostalgia: f64,
    pub loneliness: f64,
    pub confidence: f64,
    pub despair: f64,
    pub excitement: f64,
    pub mystery: f64,
    pub defiance: f64,
    pub gratitude: f64,
    pub spirituality: f64,
}

impl EmotionScores {
    pub fn get(&self, emotion: Emotion) -> f64 {
        *self.slot(emotion)
    }

    pub fn set(&mut self, emotion: Emotion, score: f64) {
        *self.slot_mut(emotion) = score;
    }

    /// Scores in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.iter().map(move |&e| (e, self.get(e)))
    }

    /// Every score must be a number in `[0, 1]`.
    pub fn validate(&self) -> Result<(), String> {
        match self.iter().find(|(_, s)| !(0.0..=1.0).contains(s)) {
            Some((emotion, score)) => Err(format!("{} score {} outside [0, 1]", emotion, score)),
            None => Ok(()),
        }
    }

    fn slot(&self, emotion: Emotion) -> &f64 {
        match emotion {
            Emotion::Joy => &self.joy,
            Emotion::Sadness => &self.sadness,
            Emotion::Anger => &self.anger,
            Emotion::Fear => &self.fear,
            Emotion::Love => &self.love,
            Emotion::Hope => &self.hope,
            Emotion::Nostalgia => &self.nostalgia,
            Emotion::Loneliness => &self.loneliness,
            Emotion::Confidence => &self.confidence,
            Emotion::Despair => &self.despair,
            Emotion::Excitement => &self.excitement,
            Emotion::Mystery => &self.mystery,
            Emotion::Defiance => &self.defiance,
            Emotion::Gratitude => &self.gratitude,
            Emotion::Spirituality => &self.spirituality,
        }
    }

    fn slot_mut(&mut self, emotion: Emotion) -> &mut f64 {
        match emotion {
            Emotion::Joy => &mut self.joy,
            Emotion::Sadness => &mut self.sadness,
            Emotion::Anger => &mut self.anger,
            Emotion::Fear => &mut self.fear,
            Emotion::Love => &mut self.love,
            Emotion::Hope => &mut self.hope,
            Emotion::Nostalgia => &mut self.nostalgia,
            Emotion::Loneliness => &mut self.loneliness,
            Emotion::Confidence => &mut self.confidence,
            Emotion::Despair => &mut self.despair,
            Emotion::Excitement => &mut self.excitement,
            Emotion::Mystery => &mut self.mystery,
            Emotion::Defiance => &mut self.defiance,
            Emotion::Gratitude => &mut self.gratitude,
            Emotion::Spirituality => &mut self.spirituality,
        }
    }
}

impl FromIterator<(Emotion, f64)> for EmotionScores {
    fn from_iter<I: IntoIterator<Item = (Emotion, f64)>>(iter: I) -> Self {
        let mut scores = EmotionScores::default();
        for (emotion, score) in iter {
            scores.set(emotion, score);
        }
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_profile() -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for e in Emotion::ALL {
            map.insert(e.as_str().to_string(), json!(0.1));
        }
        serde_json::Value::Object(map)
    }

    #[test]
    fn serde_names_match_display() {
        for e in Emotion::ALL {
            assert_eq!(serde_json::to_value(e).unwrap(), json!(e.as_str()));
        }
        let parsed: Emotion = serde_json::from_str("\"nostalgia\"").unwrap();
        assert_eq!(parsed, Emotion::Nostalgia);
    }

    #[test]
    fn decodes_complete_vocabulary() {
        let scores: EmotionScores = serde_json::from_value(full_profile()).unwrap();
        assert!(scores.iter().all(|(_, s)| s == 0.1));
        assert_eq!(scores.iter().count(), 15);
    }

    #[test]
    fn partial_profile_is_rejected() {
        let mut value = full_profile();
        value.as_object_mut().unwrap().remove("despair");

        let err = serde_json::from_value::<EmotionScores>(value).unwrap_err();
        assert!(err.to_string().contains("despair"));
    }

    #[test]
    fn unknown_emotion_is_rejected() {
        let mut value = full_profile();
        value["boredom"] = json!(0.2);

        assert!(serde_json::from_value::<EmotionScores>(value).is_err());
    }

    #[test]
    fn out_of_range_score_fails_validation() {
        let scores: EmotionScores = [(Emotion::Fear, 1.5)].into_iter().collect();
        let err = scores.validate().unwrap_err();
        assert!(err.contains("fear"));

        let scores: EmotionScores = [(Emotion::Hope, f64::NAN)].into_iter().collect();
        assert!(scores.validate().is_err());

        let scores: EmotionScores = [(Emotion::Joy, 1.0), (Emotion::Love, 0.0)]
            .into_iter()
            .collect();
        assert!(scores.validate().is_ok());
    }
}
