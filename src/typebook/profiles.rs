//! Category profiles and the classification keyword sets.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use super::category::Category;

/// Mapping category -> keyword list. The classification ruleset.
pub type KeywordSet = BTreeMap<Category, Vec<String>>;

/// Descriptive profile of one category.
#[derive(Debug, Clone)]
pub struct CategoryProfile {
    pub category: Category,
    /// Korean display name.
    pub name: &'static str,
    pub description: &'static str,
    /// Skills recommended when this category scores.
    pub skills: &'static [&'static str],
    /// Hex display colour.
    pub color: &'static str,
}

const R_KEYWORDS: &[&str] = &[
    "수리", "고장", "기계", "도구", "건설", "제작", "기술", "물건", "조작", "설치", "건축", "전기",
    "배관", "목공", "금속", "플라스틱", "자동차", "로봇", "장비", "시설", "환경", "자연", "농업",
    "어업", "임업", "광업", "운송", "물류",
];

const I_KEYWORDS: &[&str] = &[
    "분석", "연구", "문제", "논리", "실험", "탐구", "가설", "검증", "과학", "수학", "컴퓨터",
    "프로그래밍", "데이터", "통계", "의학", "생물학", "화학", "물리학", "심리학", "사회학",
    "경제학", "철학", "역사", "고고학", "지질학", "천문학", "발명", "혁신", "창의", "아이디어",
    "이론", "원리", "법칙", "패턴",
];

const A_KEYWORDS: &[&str] = &[
    "창작", "디자인", "표현", "혁신", "예술", "창의", "자유", "상상", "감성", "음악", "미술",
    "문학", "연극", "영화", "사진", "패션", "인테리어", "건축", "웹디자인", "그래픽", "일러스트",
    "애니메이션", "편집", "기획", "스토리", "브랜딩", "마케팅", "광고", "홍보", "커뮤니케이션",
    "표현력", "상상력",
];

const S_KEYWORDS: &[&str] = &[
    "가르치기", "교육", "상담", "협력", "소통", "도움", "사람", "팀", "지원", "치료", "의료",
    "간호", "사회복지", "상담심리", "청소년", "노인", "장애인", "커뮤니티", "봉사", "자원봉사",
    "모금", "기부", "나눔", "공감", "이해", "조정", "중재", "협상", "화해", "평화", "인권", "정의",
    "평등",
];

const E_KEYWORDS: &[&str] = &[
    "이끌기", "리더", "팀", "계획", "설득", "프로젝트", "사업", "목표", "성과", "경영", "관리",
    "마케팅", "영업", "투자", "금융", "보험", "부동산", "무역", "정치", "법률", "언론", "방송",
    "미디어", "엔터테인먼트", "스포츠", "관광", "호텔", "레스토랑", "유통", "물류", "운송", "통신",
    "IT", "소프트웨어",
];

const C_KEYWORDS: &[&str] = &[
    "정리", "계산", "기록", "검토", "품질", "정확", "체계", "관리", "감독", "회계", "세무", "재무",
    "인사", "총무", "기획", "조사", "통계", "분석", "보고서", "문서", "자료", "데이터", "정보",
    "시스템", "프로세스", "절차", "규정", "법규", "표준", "인증", "평가", "감사", "점검",
    "모니터링",
];

const R_SKILLS: &[&str] = &["실행", "제작", "기술", "기계조작", "건설", "수리", "설치", "운영"];
const I_SKILLS: &[&str] = &["문제해결", "분석", "연구", "논리적사고", "창의적사고", "실험", "탐구"];
const A_SKILLS: &[&str] = &["창작", "디자인", "표현", "혁신", "예술적감각", "상상력", "창의력"];
const S_SKILLS: &[&str] = &["소통", "교육", "상담", "협력", "공감", "지원", "치료", "봉사"];
const E_SKILLS: &[&str] = &["리더십", "설득", "계획", "조직", "의사결정", "경영", "관리", "마케팅"];
const C_SKILLS: &[&str] = &["정리", "계산", "기록", "검토", "품질관리", "체계화", "표준화", "관리"];

fn standard_profile(category: Category) -> CategoryProfile {
    let (name, description, skills, color) = match category {
        Category::R => ("현실형", "구체적이고 체계적인 작업을 선호", R_SKILLS, "#FF6B6B"),
        Category::I => ("탐구형", "논리적이고 분석적인 작업을 선호", I_SKILLS, "#4ECDC4"),
        Category::A => ("예술형", "자유롭고 창의적인 표현을 선호", A_SKILLS, "#45B7D1"),
        Category::S => ("사회형", "사람들과의 상호작용을 선호", S_SKILLS, "#96CEB4"),
        Category::E => ("진취형", "리더십과 설득을 통한 성과 달성을 선호", E_SKILLS, "#FFEAA7"),
        Category::C => ("관습형", "정확하고 체계적인 업무 처리를 선호", C_SKILLS, "#DDA0DD"),
    };

    CategoryProfile {
        category,
        name,
        description,
        skills,
        color,
    }
}

fn standard_keywords(category: Category) -> &'static [&'static str] {
    match category {
        Category::R => R_KEYWORDS,
        Category::I => I_KEYWORDS,
        Category::A => A_KEYWORDS,
        Category::S => S_KEYWORDS,
        Category::E => E_KEYWORDS,
        Category::C => C_KEYWORDS,
    }
}

/// Immutable registry of category profiles and keyword lists.
#[derive(Debug, Clone)]
pub struct TypeBook {
    profiles: BTreeMap<Category, CategoryProfile>,
    keywords: KeywordSet,
}

impl TypeBook {
    /// The compiled-in registry.
    pub fn standard() -> Self {
        let keywords = Category::ALL
            .iter()
            .map(|c| {
                let list = standard_keywords(*c).iter().map(|k| k.to_string()).collect();
                (*c, list)
            })
            .collect();
        Self::with_keywords(keywords)
    }

    /// Standard profiles with a custom keyword set.
    ///
    /// Categories missing from `keywords` get an empty list. Duplicate keywords
    /// inside one list are dropped, keeping the first occurrence.
    pub fn with_keywords(keywords: KeywordSet) -> Self {
        let profiles = Category::ALL
            .iter()
            .map(|c| (*c, standard_profile(*c)))
            .collect();

        let keywords = Category::ALL
            .iter()
            .map(|c| {
                let mut seen = std::collections::HashSet::new();
                let list: Vec<String> = keywords
                    .get(c)
                    .map(|l| l.iter().filter(|k| seen.insert(k.as_str())).cloned().collect())
                    .unwrap_or_default();
                (*c, list)
            })
            .collect();

        Self { profiles, keywords }
    }

    /// Profile of a category.
    pub fn profile(&self, category: Category) -> &CategoryProfile {
        // Every category is inserted by the constructors.
        &self.profiles[&category]
    }

    /// Keyword list of a category.
    pub fn keywords(&self, category: Category) -> &[String] {
        self.keywords
            .get(&category)
            .map(|k| k.as_slice())
            .unwrap_or(&[])
    }

    /// Skills recommended for a category.
    pub fn skills(&self, category: Category) -> &'static [&'static str] {
        self.profile(category).skills
    }

    /// The full keyword set.
    pub fn keyword_set(&self) -> &KeywordSet {
        &self.keywords
    }

    /// SHA256 fingerprint of the keyword set.
    ///
    /// Recorded in snapshot metadata so a snapshot built against another
    /// ruleset can be detected.
    pub fn fingerprint(&self) -> String {
        let canonical = Category::ALL
            .iter()
            .map(|c| format!("{}:{}", c.code(), self.keywords(*c).join(",")))
            .collect::<Vec<_>>()
            .join("\n");

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl Default for TypeBook {
    fn default() -> Self {
        Self::standard()
    }
}
