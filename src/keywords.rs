//! The ordered keyword table behind category detection.
//!
//! Keywords overlap (辅食 is both food and a supplement, 学 is inside 学会),
//! so the table is a priority list: the first row with any keyword present
//! in the text wins.

use record_types::{Category, EatKind};

pub const SLEEP_KEYWORDS: &[&str] = &["睡觉", "睡眠", "午睡", "入睡", "醒来"];

/// Milk feeds. Checked before everything but sleep.
pub const MILK_KEYWORDS: &[&str] = &["吃奶", "喝奶", "喂奶", "母乳"];

/// Solid food. 辅食 also appears under supplements, which rank higher.
pub const FOOD_KEYWORDS: &[&str] = &["吃饭", "辅食", "喝粥", "米糊", "吃米"];

pub const PLAY_KEYWORDS: &[&str] = &["玩耍", "玩", "游戏", "玩具"];

pub const STUDY_KEYWORDS: &[&str] = &["学习", "学", "识字", "认字", "阅读", "绘本"];

pub const SUPPLEMENT_KEYWORDS: &[&str] =
    &["辅食", "补钙", "补锌", "补充", "营养", "维生素", "DHA"];

pub const MILESTONE_KEYWORDS: &[&str] = &["里程碑", "第一次", "学会", "达成"];

/// A detection branch: a category plus, for `eat`, milk vs. food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Sleep,
    Milk,
    Supplement,
    Food,
    Play,
    Study,
    Milestone,
}

impl Branch {
    pub fn category(&self) -> Category {
        match self {
            Self::Sleep => Category::Sleep,
            Self::Milk | Self::Food => Category::Eat,
            Self::Supplement => Category::Supplement,
            Self::Play => Category::Play,
            Self::Study => Category::Study,
            Self::Milestone => Category::Milestone,
        }
    }

    pub fn eat_kind(&self) -> Option<EatKind> {
        match self {
            Self::Milk => Some(EatKind::Milk),
            Self::Food => Some(EatKind::Food),
            _ => None,
        }
    }
}

pub struct KeywordRule {
    pub branch: Branch,
    pub keywords: &'static [&'static str],
}

/// Detection order. Earlier rows win.
pub static KEYWORD_TABLE: &[KeywordRule] = &[
    KeywordRule {
        branch: Branch::Sleep,
        keywords: SLEEP_KEYWORDS,
    },
    KeywordRule {
        branch: Branch::Milk,
        keywords: MILK_KEYWORDS,
    },
    KeywordRule {
        branch: Branch::Supplement,
        keywords: SUPPLEMENT_KEYWORDS,
    },
    KeywordRule {
        branch: Branch::Food,
        keywords: FOOD_KEYWORDS,
    },
    KeywordRule {
        branch: Branch::Play,
        keywords: PLAY_KEYWORDS,
    },
    KeywordRule {
        branch: Branch::Study,
        keywords: STUDY_KEYWORDS,
    },
    KeywordRule {
        branch: Branch::Milestone,
        keywords: MILESTONE_KEYWORDS,
    },
];
