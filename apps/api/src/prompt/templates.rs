use serde::Serialize;

/// Template id meaning "no template, free-text task".
pub const CUSTOM_TEMPLATE_ID: &str = "custom";

/// A preset role plus the task options a user can tick.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PromptTemplate {
    pub id: &'static str,
    pub role: &'static str,
    pub tasks: &'static [&'static str],
}

pub const TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "email",
        role: "あなたはビジネスライティングのプロフェッショナルです",
        tasks: &[
            "初めてお会いした方への挨拶メール",
            "訪問アポイントメントの依頼",
            "質問・問い合わせメール",
            "謝罪メール",
            "お礼・感謝のメール",
            "進捗報告メール",
        ],
    },
    PromptTemplate {
        id: "codeReview",
        role: "あなたは経験豊富なシニアエンジニアです",
        tasks: &[
            "コードの品質とベストプラクティスの確認",
            "セキュリティの脆弱性チェック",
            "パフォーマンスの最適化提案",
            "コードの可読性・保守性の評価",
            "テストカバレッジの確認",
            "設計パターンの適用確認",
        ],
    },
    PromptTemplate {
        id: "analysis",
        role: "あなたは分析と洞察に長けたコンサルタントです",
        tasks: &[
            "文書の要約と重要ポイントの抽出",
            "データの傾向分析",
            "問題点の特定と改善提案",
            "競合分析・比較検討",
            "リスク評価と対策提案",
            "ROI・効果測定の分析",
        ],
    },
    PromptTemplate {
        id: "presentation",
        role: "あなたはプレゼンテーション設計のエキスパートです",
        tasks: &[
            "魅力的なタイトルとアウトラインの作成",
            "ストーリーテリング構成の設計",
            "データビジュアライゼーションの提案",
            "聴衆に響くメッセージの作成",
            "Q&A想定問答の準備",
            "スライドデザインの改善提案",
        ],
    },
    PromptTemplate {
        id: "sns",
        role: "あなたはSNSマーケティングのスペシャリストです",
        tasks: &[
            "エンゲージメントの高い投稿文作成",
            "トレンドを活用したハッシュタグ提案",
            "フォロワー増加につながるコンテンツ企画",
            "ブランド認知向上のための投稿戦略",
            "ユーザーとの交流を促進する質問投稿",
            "キャンペーン告知の魅力的な投稿",
            "ストーリー性のある連続投稿企画",
            "インフルエンサーとのコラボ投稿案",
        ],
    },
    PromptTemplate {
        id: "blog",
        role: "あなたは企業ブログのコンテンツライターです",
        tasks: &[
            "SEOに最適化された記事タイトルと構成",
            "業界の専門知識を活かした解説記事",
            "製品・サービスの魅力を伝える記事",
            "顧客事例・成功事例の紹介記事",
            "業界トレンドの分析・解説記事",
            "会社の取り組みや文化を紹介する記事",
            "ハウツー・チュートリアル記事",
            "読者の疑問に答えるQ&A記事",
        ],
    },
];

pub fn find_template(id: &str) -> Option<&'static PromptTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}
