//! Curated self-help guides, one per topic except `general`.

use super::topic::Topic;

pub const STRESS_GUIDE: &str = "😌 Coping with Stress

1. Take short breaks. Step away from the task for five minutes every hour.
2. Deep breathing. Breathe in for 4 seconds, hold for 4, breathe out for 6.
3. Break big tasks into small steps and finish one at a time.

Stress is a signal, not a verdict. Be as patient with yourself as you would be with a friend.";

pub const PANIC_GUIDE: &str = "😮‍💨 Panic/Anxiety Help

1. Remind yourself it will pass. Panic peaks and fades, usually within minutes.
2. Ground yourself with 5-4-3-2-1: name 5 things you see, 4 you feel, 3 you hear, 2 you smell, 1 you taste.
3. Slow your exhale. Breathe out longer than you breathe in.

You are not in danger right now, even if your body says otherwise.";

pub const DEPRESSION_GUIDE: &str = "🌧 Feeling Low/Depressed

1. Keep a routine. Get up, eat and go to bed at roughly the same times.
2. Schedule one small enjoyable activity today, even for ten minutes.
3. Reach out to one person, even with a simple 'hi'.

Low days do not define you. Small steps still count.";

pub const SLEEP_GUIDE: &str = "🌙 Better Sleep Tips

1. Keep a fixed bedtime and wake-up time, including weekends.
2. Avoid caffeine in the afternoon and evening.
3. Put screens away an hour before bed and keep the lights dim.

If you cannot fall asleep after 20 minutes, get up and do something calm until you feel sleepy.";

pub const CRISIS_RESOURCES: &str = "📞 Crisis Resources:
- 988 Suicide & Crisis Lifeline
- Crisis Text Line: text HOME to 741741
⚠ Not a replacement for professional help.";

/// Returns the static guide for a topic, if it has one.
pub fn guide_for(topic: Topic) -> Option<&'static str> {
    match topic {
        Topic::Stress => Some(STRESS_GUIDE),
        Topic::Panic => Some(PANIC_GUIDE),
        Topic::Depression => Some(DEPRESSION_GUIDE),
        Topic::Sleep => Some(SLEEP_GUIDE),
        Topic::General => None,
    }
}

/// Guide text as presented to the user: the guide, plus crisis resources
/// for topics that require them.
pub fn compose_guide(topic: Topic) -> Option<String> {
    let guide = guide_for(topic)?;
    if topic.needs_crisis_resources() {
        Some(format!("{}\n\n{}", guide, CRISIS_RESOURCES))
    } else {
        Some(guide.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_has_no_guide() {
        assert!(guide_for(Topic::General).is_none());
        assert!(compose_guide(Topic::General).is_none());
    }

    #[test]
    fn test_sleep_guide_is_unmodified() {
        assert_eq!(compose_guide(Topic::Sleep).as_deref(), Some(SLEEP_GUIDE));
    }

    #[test]
    fn test_crisis_block_follows_guide() {
        let panic = compose_guide(Topic::Panic).unwrap();
        assert!(panic.starts_with(PANIC_GUIDE));
        assert!(panic.ends_with(CRISIS_RESOURCES));

        let stress = compose_guide(Topic::Stress).unwrap();
        assert!(!stress.contains(CRISIS_RESOURCES));
    }
}
