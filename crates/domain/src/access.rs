//! 基于所有权的访问控制
//!
//! 纯函数判断，调用方负责把 `false` 转换成 forbidden 结果。

use crate::message::Message;
use crate::room::Room;
use crate::user::User;

/// 只有房主可以修改或删除房间。
pub fn can_modify_room(user: &User, room: &Room) -> bool {
    user.id == room.host_id
}

/// 只有作者可以删除消息。
pub fn can_delete_message(user: &User, message: &Message) -> bool {
    user.id == message.user_id
}
