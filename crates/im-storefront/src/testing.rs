//! Fixtures shared by the controller tests.

use im_api_types::{CategoryId, Condition, Instrument, InstrumentId, Price, Role, User, UserId};
use im_client::MemoryStore;
use std::rc::Rc;

use crate::session::SessionContext;

pub fn instrument(id: i64) -> Instrument {
    Instrument {
        id: InstrumentId(id),
        title: format!("吉他 {id}"),
        description: None,
        price: Price(800.0),
        original_price: None,
        category_id: Some(CategoryId(1)),
        category_name: None,
        condition: Condition::LikeNew,
        brand: None,
        model: Some(" ".into()),
        status: Default::default(),
        view_count: 10,
        favorite_count: 2,
        location: None,
        audio_url: None,
        created_at: None,
        main_image: None,
        images: Vec::new(),
        user: None,
        is_favorited: false,
    }
}

pub fn user(username: &str) -> User {
    User {
        id: UserId(11),
        username: username.to_string(),
        email: None,
        role: Role::User,
        avatar: None,
        real_name: None,
        phone: None,
        student_id: None,
        credit_score: Some(100),
        is_seller: false,
        is_admin: false,
    }
}

pub fn instrument_json(id: i64) -> String {
    format!(
        r#"{{"id":{id},"title":"吉他 {id}","price":800,"category_id":1,"condition":"good"}}"#
    )
}

pub struct Stores {
    pub session: Rc<MemoryStore>,
    pub durable: Rc<MemoryStore>,
}

impl Stores {
    pub fn new() -> Self {
        Self {
            session: Rc::new(MemoryStore::new()),
            durable: Rc::new(MemoryStore::new()),
        }
    }

    pub fn context(&self) -> SessionContext<Rc<MemoryStore>> {
        SessionContext::load(self.session.clone(), self.durable.clone())
    }
}
