/// 경매 조회
pub const GET_AUCTION: &str = "SELECT id, title, description, starting_price, start_date, end_date, category, image_url, owner_id, status, created_at FROM auctions WHERE id = $1";

/// 판매자별 경매 조회
pub const GET_OWNER_AUCTIONS: &str = r#"
    SELECT id, title, description, starting_price, start_date, end_date, category, image_url, owner_id, status, created_at
    FROM auctions
    WHERE owner_id = $1
    ORDER BY created_at DESC, id DESC
"#;

/// 경매 생성 (상태는 테이블 기본값 INACTIVE)
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (title, description, starting_price, start_date, end_date, category, image_url, owner_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    RETURNING id, title, description, starting_price, start_date, end_date, category, image_url, owner_id, status, created_at
"#;

/// 초안 경매 삭제 (INACTIVE 상태일 때만)
pub const DELETE_DRAFT_AUCTION: &str =
    "DELETE FROM auctions WHERE id = $1 AND status = 'INACTIVE'";

/// 경매 상태 조회
pub const GET_AUCTION_STATUS: &str = "SELECT status FROM auctions WHERE id = $1";
