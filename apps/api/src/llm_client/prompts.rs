// Shared prompt constants.
// The prompt builder composes its own text; this file holds the fixed
// instructions sent alongside images.

/// Instruction sent with a business-card image. The reply is fed to
/// `cards::extract::extract_contact`, which tolerates prose around the JSON.
pub const BUSINESS_CARD_EXTRACT_PROMPT: &str = r#"この名刺画像から以下の情報を抽出して、必ずJSON形式のみで返してください。

抽出する情報：
- name: 氏名
- company: 会社名
- department: 部署名
- position: 役職
- phone: 電話番号
- email: メールアドレス
- address: 住所

重要：
- 情報が見つからない場合は空文字列("")を使用
- 説明文や追加テキストは一切含めない
- 以下の形式で回答:

{
  "name": "抽出された氏名",
  "company": "抽出された会社名",
  "department": "抽出された部署名",
  "position": "抽出された役職",
  "phone": "抽出された電話番号",
  "email": "抽出されたメールアドレス",
  "address": "抽出された住所"
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_prompt_names_every_contact_field() {
        for field in [
            "name",
            "company",
            "department",
            "position",
            "phone",
            "email",
            "address",
        ] {
            assert!(
                BUSINESS_CARD_EXTRACT_PROMPT.contains(&format!("\"{field}\"")),
                "prompt is missing {field}"
            );
        }
    }
}
