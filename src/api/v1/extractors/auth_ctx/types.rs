/*
 * Responsibility
 * - Handler / guard から見える「リクエスト単位の認証コンテキスト」の型
 * - authenticate middleware が 1 リクエストにつき 1 回だけ作って extensions に格納する
 *
 * Notes
 * - トークン検証ロジックは services/auth 側の責務
 * - 作成後は読み取り専用 (principal を後から差し替える API は持たない)
 */

use crate::services::auth::Principal;

/// 認証済みなら principal を 1 つだけ持つ。未認証 (トークン無し / 検証失敗) なら空。
#[derive(Debug, Clone, Default)]
pub struct AuthCtx {
    principal: Option<Principal>,
}

impl AuthCtx {
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}
